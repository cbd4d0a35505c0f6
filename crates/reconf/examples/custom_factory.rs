//! Example: custom bean factory
//!
//! Declares a small object graph in JSON, then creates it through a factory
//! that hands out pooled connections and the default factory for
//! everything else.
//!
//! Run with:
//!   `cargo run --example custom_factory --features serde`

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use reconf::Bean;
use reconf::ConfigValue;
use reconf::bean::{
    BasicBeanDeclaration, BeanClass, BeanCreationContext, BeanError, BeanFactory, BeanHelper,
    BeanInstance, DefaultBeanFactory,
};

#[derive(Bean, Debug, Default)]
struct Connection {
    url: String,
    #[bean(skip)]
    id: u32,
}

#[derive(Bean, Debug, Default)]
struct Service {
    name: String,
    #[bean(rename = "maxRequests")]
    max_requests: u32,
    #[bean(nested)]
    primary: Connection,
    #[bean(nested)]
    replicas: Vec<Connection>,
}

/// Hands out connections with increasing ids.
///
/// The factory parameter (`config-factoryparam`) is used as an id offset.
struct PoolFactory {
    next_id: AtomicU32,
}

impl BeanFactory for PoolFactory {
    fn create_bean(&self, ctx: &BeanCreationContext<'_>) -> Result<BeanInstance, BeanError> {
        let offset = ctx
            .factory_parameter()
            .and_then(ConfigValue::to_u32)
            .unwrap_or(0);

        let mut bean = DefaultBeanFactory.create_bean_instance(ctx)?;
        ctx.init_bean(&mut bean)?;
        if let Some(connection) = bean.downcast_mut::<Connection>() {
            connection.id = offset + self.next_id.fetch_add(1, Ordering::SeqCst);
        }
        Ok(bean)
    }

    fn default_bean_class(&self) -> Option<&str> {
        Some("Connection")
    }
}

fn main() -> reconf::Result<()> {
    let helper = BeanHelper::new();
    helper.register_class(BeanClass::of::<Connection>("Connection"))?;
    helper.register_class(BeanClass::of::<Service>("Service"))?;
    helper.register_bean_factory(
        "pool",
        Arc::new(PoolFactory {
            next_id: AtomicU32::new(1),
        }),
    )?;

    let document = serde_json::json!({
        "config-class": "Service",
        "name": "orders",
        "maxRequests": "250",
        "primary": {
            "config-factory": "pool",
            "url": "postgres://primary/orders"
        },
        "replicas": [
            { "config-factory": "pool", "config-factoryparam": 100, "url": "postgres://replica-a/orders" },
            { "config-factory": "pool", "config-factoryparam": 100, "url": "postgres://replica-b/orders" }
        ]
    });

    let declaration = BasicBeanDeclaration::from_value(&ConfigValue::from(document))?;
    let service: Service = helper.create_bean_as(&declaration)?;

    println!("=== Custom Factory Example ===\n");
    println!("Service {} (max {} requests)", service.name, service.max_requests);
    println!("  primary: #{} {}", service.primary.id, service.primary.url);
    for replica in &service.replicas {
        println!("  replica: #{} {}", replica.id, replica.url);
    }

    Ok(())
}
