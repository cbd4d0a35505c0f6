//! Performance benchmarks for reload checks and bean creation.
//!
//! Run with: `cargo bench -p reconf`

#![allow(clippy::pedantic)]

use std::sync::Arc;

use reconf::Bean;
use reconf::bean::{
    BasicBeanDeclaration, BeanClass, BeanHelper, ConstructorArg, ParamType, find_constructor,
};
use reconf::reloading::{
    CombinedReloadingController, ReloadingControl, ReloadingController, ReloadingDetector,
};

fn main() {
    divan::main();
}

// ============================================================================
// Reloading
// ============================================================================

struct Quiet;

impl ReloadingDetector for Quiet {
    fn is_reloading_required(&mut self) -> bool {
        false
    }

    fn reloading_performed(&mut self) {}
}

#[divan::bench]
fn controller_check(bencher: divan::Bencher) {
    let controller = ReloadingController::new(Quiet);
    bencher.bench(|| divan::black_box(controller.check_for_reloading(None)));
}

#[divan::bench(args = [1, 8, 64])]
fn combined_check(bencher: divan::Bencher, children: usize) {
    let controller = CombinedReloadingController::new(
        (0..children).map(|_| Arc::new(ReloadingController::new(Quiet)) as Arc<dyn ReloadingControl>),
    );
    bencher.bench(|| divan::black_box(controller.check_for_reloading(None)));
}

// ============================================================================
// Beans
// ============================================================================

#[derive(Bean, Default)]
struct Endpoint {
    host: String,
    port: u16,
    #[bean(nested)]
    fallback: Option<Fallback>,
}

#[derive(Bean, Default)]
struct Fallback {
    host: String,
    port: u16,
}

struct Label;

fn label_class() -> BeanClass {
    BeanClass::builder::<Label>("Label")
        .constructor([ParamType::String], |_| Ok(Label))
        .constructor([ParamType::String, ParamType::Int], |_| Ok(Label))
        .constructor([ParamType::Int, ParamType::Int], |_| Ok(Label))
        .build()
}

#[divan::bench]
fn constructor_resolution(bencher: divan::Bencher) {
    let class = label_class();
    let args = [ConstructorArg::typed("a", "String"), ConstructorArg::typed("7", "int")];
    bencher.bench(|| divan::black_box(find_constructor(&class, &args).is_ok()));
}

#[divan::bench]
fn create_nested_bean(bencher: divan::Bencher) {
    let helper = BeanHelper::new();
    helper
        .register_class(BeanClass::of::<Endpoint>("Endpoint"))
        .expect("register");
    helper
        .register_class(BeanClass::of::<Fallback>("Fallback"))
        .expect("register");

    let decl = BasicBeanDeclaration::new()
        .with_class("Endpoint")
        .with_property("host", "primary")
        .with_property("port", 8080)
        .with_nested(
            "fallback",
            BasicBeanDeclaration::new()
                .with_property("host", "secondary")
                .with_property("port", "8081"),
        );

    bencher.bench(|| divan::black_box(helper.create_bean_as::<Endpoint>(&decl).is_ok()));
}
