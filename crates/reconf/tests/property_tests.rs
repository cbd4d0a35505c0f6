//! Property-based tests for reconf invariants.
//!
//! These tests verify that critical invariants hold for all possible inputs,
//! not just hand-picked test cases.

#![allow(clippy::pedantic)]

use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Combined Controller Properties
// ============================================================================

mod combined_controller_properties {
    use super::*;
    use reconf::reloading::{
        CombinedReloadingController, ListenerId, ManualReloadingDetector, ReloadData,
        ReloadingControl, ReloadingController, ReloadingListener,
    };

    /// Child controller with a fixed answer that counts its checks.
    struct FixedControl {
        answer: bool,
        checks: Arc<AtomicUsize>,
        delegate: ReloadingController,
    }

    impl ReloadingControl for FixedControl {
        fn check_for_reloading(&self, _data: Option<&ReloadData>) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.answer
        }

        fn reset_reloading_state(&self) {}

        fn is_in_reloading_state(&self) -> bool {
            self.answer
        }

        fn add_listener(&self, listener: ReloadingListener) -> ListenerId {
            self.delegate.add_listener(listener)
        }

        fn remove_listener(&self, id: ListenerId) -> bool {
            self.delegate.remove_listener(id)
        }
    }

    fn combined(answers: &[bool]) -> (CombinedReloadingController, Vec<Arc<AtomicUsize>>) {
        let counters: Vec<_> = answers.iter().map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let children = answers.iter().zip(&counters).map(|(&answer, checks)| {
            Arc::new(FixedControl {
                answer,
                checks: checks.clone(),
                delegate: ReloadingController::new(ManualReloadingDetector::new()),
            }) as Arc<dyn ReloadingControl>
        });
        (CombinedReloadingController::new(children), counters)
    }

    proptest! {
        /// The combined result is the OR of the children
        #[test]
        fn result_is_or_of_children(answers in prop::collection::vec(prop::bool::ANY, 0..8)) {
            let (controller, _) = combined(&answers);
            prop_assert_eq!(
                controller.check_for_reloading(None),
                answers.iter().any(|&answer| answer)
            );
        }

        /// Every child is queried exactly once per check
        #[test]
        fn every_child_queried_once(answers in prop::collection::vec(prop::bool::ANY, 0..8)) {
            let (controller, counters) = combined(&answers);
            controller.check_for_reloading(None);

            for checks in &counters {
                prop_assert_eq!(checks.load(Ordering::SeqCst), 1);
            }
        }

        /// Once pending, further checks do not reach the children
        #[test]
        fn pending_state_is_sticky(answers in prop::collection::vec(prop::bool::ANY, 1..8), extra in 1usize..5) {
            let (controller, counters) = combined(&answers);
            let first = controller.check_for_reloading(None);

            for _ in 0..extra {
                prop_assert_eq!(controller.check_for_reloading(None), first);
            }

            if first {
                for checks in &counters {
                    prop_assert_eq!(checks.load(Ordering::SeqCst), 1);
                }
            }
        }
    }
}

// ============================================================================
// Controller Properties
// ============================================================================

mod controller_properties {
    use super::*;
    use reconf::reloading::{ReloadingControl, ReloadingController, ReloadingDetector};

    #[derive(Clone, Default)]
    struct SequenceDetector {
        answers: Arc<parking_lot::Mutex<Vec<bool>>>,
        checks: Arc<AtomicUsize>,
        performed: Arc<AtomicUsize>,
    }

    impl ReloadingDetector for SequenceDetector {
        fn is_reloading_required(&mut self) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.answers.lock().pop().unwrap_or(false)
        }

        fn reloading_performed(&mut self) {
            self.performed.fetch_add(1, Ordering::SeqCst);
        }
    }

    proptest! {
        /// Resets outside reloading state never reach the detector
        #[test]
        fn reset_only_after_detection(answers in prop::collection::vec(prop::bool::ANY, 0..20)) {
            let detector = SequenceDetector::default();
            *detector.answers.lock() = answers.iter().rev().copied().collect();
            let controller = ReloadingController::new(detector.clone());

            let mut expected_performed = 0;
            for _ in 0..answers.len() {
                let pending = controller.check_for_reloading(None);
                if pending {
                    expected_performed += 1;
                }
                controller.reset_reloading_state();
            }

            prop_assert_eq!(detector.performed.load(Ordering::SeqCst), expected_performed);
            prop_assert_eq!(expected_performed, answers.iter().filter(|&&a| a).count());
        }

        /// While pending the detector is not consulted
        #[test]
        fn debounce_skips_detector(repeats in 1usize..50) {
            let detector = SequenceDetector::default();
            *detector.answers.lock() = vec![true];
            let controller = ReloadingController::new(detector.clone());

            for _ in 0..repeats {
                prop_assert!(controller.check_for_reloading(None));
            }
            prop_assert_eq!(detector.checks.load(Ordering::SeqCst), 1);
        }
    }
}

// ============================================================================
// ConfigValue Properties
// ============================================================================

mod config_value_properties {
    use super::*;
    use reconf::ConfigValue;

    proptest! {
        /// Integer text converts to the same integer
        #[test]
        fn integer_text_converts(n in prop::num::i64::ANY) {
            prop_assert_eq!(ConfigValue::from(n.to_string()).to_i64(), Some(n));
        }

        /// Text holding an i32 converts to i32
        #[test]
        fn numeric_text_converts(n in prop::num::i32::ANY) {
            let value = ConfigValue::from(n.to_string());
            prop_assert_eq!(value.to_i32(), Some(n));
            prop_assert_eq!(value.to_i64(), Some(i64::from(n)));
        }

        /// Out of range values never convert
        #[test]
        fn overflow_detected(n in (u64::from(u8::MAX) + 1)..=u64::MAX) {
            prop_assert_eq!(ConfigValue::from(n).to_u8(), None);
        }

        /// Display of a scalar parses back to an equal scalar
        #[test]
        fn display_of_integer_reparses(n in prop::num::i64::ANY) {
            let shown = ConfigValue::from(n).to_string();
            prop_assert_eq!(ConfigValue::from(shown).to_i64(), Some(n));
        }
    }
}

// ============================================================================
// Constructor Matching Properties
// ============================================================================

mod matching_properties {
    use super::*;
    use reconf::bean::{BeanClass, BeanError, ConstructorArg, ParamType, find_constructor};

    struct Target;

    fn class() -> BeanClass {
        BeanClass::builder::<Target>("Target")
            .constructor([ParamType::String], |_| Ok(Target))
            .constructor([ParamType::String, ParamType::Int], |_| Ok(Target))
            .constructor([ParamType::Int], |_| Ok(Target))
            .build()
    }

    proptest! {
        /// Two arguments always pick the two-parameter constructor
        #[test]
        fn arity_selects_constructor(first in "[a-z]{1,8}", second in prop::num::i32::ANY) {
            let class = class();
            let args = [ConstructorArg::value(first), ConstructorArg::value(second.to_string())];
            let constructor = find_constructor(&class, &args).unwrap();
            prop_assert_eq!(constructor.arity(), 2);
        }

        /// Untyped text is ambiguous between String and Int, numeric or not
        #[test]
        fn untyped_text_is_ambiguous(text in ".{0,12}") {
            let class = class();
            let err = find_constructor(&class, &[ConstructorArg::value(text)]).unwrap_err();
            let is_ambiguous = matches!(err, BeanError::AmbiguousConstructor { ref class, .. } if class == "Target");
            prop_assert!(is_ambiguous);
        }

        /// Resolution is deterministic
        #[test]
        fn resolution_is_deterministic(text in "[a-z0-9]{1,6}", hint in prop::option::of(prop::sample::select(vec!["int", "String"]))) {
            let class = class();
            let arg = match hint {
                Some(hint) => ConstructorArg::typed(text, hint),
                None => ConstructorArg::value(text),
            };
            let first = find_constructor(&class, std::slice::from_ref(&arg)).map(|c| c.params().to_vec());
            let second = find_constructor(&class, std::slice::from_ref(&arg)).map(|c| c.params().to_vec());
            prop_assert_eq!(first.ok(), second.ok());
        }
    }
}
