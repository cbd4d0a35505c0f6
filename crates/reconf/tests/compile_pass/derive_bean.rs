//! Every attribute of `#[derive(Bean)]` in one struct.

use std::path::PathBuf;

use reconf::Bean;
use reconf::bean::{BeanClass, BeanProperties, ClassRegistry};

#[derive(Bean, Default)]
struct Tls {
    certificate: PathBuf,
    verify: bool,
}

#[derive(Bean, Default)]
struct Upstream {
    host: String,
    port: u16,
}

#[derive(Bean, Default)]
struct Server {
    #[bean(rename = "listenAddress")]
    listen_address: String,
    r#type: Option<String>,
    weights: Vec<f64>,
    #[bean(nested)]
    tls: Option<Tls>,
    #[bean(class = "Backend")]
    upstreams: Vec<Upstream>,
    #[bean(skip)]
    requests: u64,
}

fn main() {
    assert_eq!(
        Server::property_names(),
        &["listenAddress", "type", "weights", "tls", "upstreams"]
    );
    assert_eq!(Server::property_class("tls"), Some("Tls"));
    assert_eq!(Server::property_class("upstreams"), Some("Backend"));
    assert_eq!(Server::property_class("weights"), None);

    let registry = ClassRegistry::new();
    registry.register(BeanClass::of::<Server>("Server")).unwrap();
    registry.register(BeanClass::of::<Tls>("Tls")).unwrap();
    registry.register(BeanClass::of::<Upstream>("Backend")).unwrap();
    assert!(registry.contains("Backend"));

    let _ = Server::default().requests;
}
