//! Generic structs keep their parameters on the generated impl.

use reconf::Bean;
use reconf::bean::{BeanProperties, FromPropertyValue, PropertyValue};

#[derive(Bean, Default)]
struct Limit<T>
where
    T: FromPropertyValue + Send + 'static,
{
    value: T,
    enabled: bool,
}

fn main() {
    let mut limit = Limit::<u32>::default();
    limit
        .set_property("value", PropertyValue::from(reconf::ConfigValue::from("8")))
        .unwrap();
    assert_eq!(limit.value, 8);
    assert!(!limit.enabled);
}
