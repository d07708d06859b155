//! Keeps the flat broker property list in sync with the structured acceptor
//! and connector fields.
//!
//! Every line is `key=value` with keys of the form
//! `<collection>Configurations.<member>.<suffix>`. Updates always remove the
//! lines keyed by the member's previous identity before appending, so the
//! list stays free of duplicates and stale entries. Order is append-only; no
//! attempt is made to preserve a member's original position across a rename.

use std::collections::BTreeMap;

use artemis_crd::broker::EndpointKind;

/// Transport implementation selected for an acceptor or connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FactoryClass {
    Netty,
    InVm,
}

impl FactoryClass {
    fn qualified_name(self, kind: EndpointKind) -> &'static str {
        match (self, kind) {
            (Self::Netty, EndpointKind::Acceptor) => {
                "org.apache.activemq.artemis.core.remoting.impl.netty.NettyAcceptorFactory"
            }
            (Self::Netty, EndpointKind::Connector) => {
                "org.apache.activemq.artemis.core.remoting.impl.netty.NettyConnectorFactory"
            }
            (Self::InVm, EndpointKind::Acceptor) => {
                "org.apache.activemq.artemis.core.remoting.impl.invm.InVMAcceptorFactory"
            }
            (Self::InVm, EndpointKind::Connector) => {
                "org.apache.activemq.artemis.core.remoting.impl.invm.InVMConnectorFactory"
            }
        }
    }
}

fn configurations_key(kind: EndpointKind) -> &'static str {
    match kind {
        EndpointKind::Acceptor => "acceptorConfigurations",
        EndpointKind::Connector => "connectorConfigurations",
    }
}

/// Key prefix owning every property line of one member.
fn member_prefix(kind: EndpointKind, name: &str) -> String {
    format!("{}.{name}.", configurations_key(kind))
}

pub(crate) fn set_factory_class(
    properties: &mut Vec<String>,
    kind: EndpointKind,
    name: &str,
    class: FactoryClass,
) {
    let key = format!("{}factoryClassName", member_prefix(kind, name));
    properties.retain(|line| line.split_once('=').map(|(k, _)| k) != Some(key.as_str()));
    properties.push(format!("{key}={}", class.qualified_name(kind)));
}

/// Replaces the member's free-form parameters wholesale: one line per pair,
/// keys missing from `params` lose their line.
pub(crate) fn set_params(
    properties: &mut Vec<String>,
    kind: EndpointKind,
    name: &str,
    params: &BTreeMap<String, String>,
) {
    let prefix = format!("{}params.", member_prefix(kind, name));
    properties.retain(|line| !line.starts_with(&prefix));
    for (key, value) in params {
        properties.push(format!("{prefix}{key}={value}"));
    }
}

/// Moves every property line of `old_name` under `new_name`, dropping any
/// line already keyed by the new identity first.
pub(crate) fn rename_member(
    properties: &mut Vec<String>,
    kind: EndpointKind,
    old_name: &str,
    new_name: &str,
) {
    let old_prefix = member_prefix(kind, old_name);
    let new_prefix = member_prefix(kind, new_name);

    let moved = properties
        .iter()
        .filter(|line| line.starts_with(&old_prefix))
        .map(|line| format!("{new_prefix}{}", &line[old_prefix.len()..]))
        .collect::<Vec<_>>();

    properties.retain(|line| !line.starts_with(&old_prefix) && !line.starts_with(&new_prefix));
    properties.extend(moved);
}

/// Drops every property line attributable to the member.
pub(crate) fn remove_member(properties: &mut Vec<String>, kind: EndpointKind, name: &str) {
    let prefix = member_prefix(kind, name);
    properties.retain(|line| !line.starts_with(&prefix));
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIND: EndpointKind = EndpointKind::Acceptor;

    #[test]
    fn factory_class_line_is_replaced_not_duplicated() {
        let mut properties = Vec::new();

        set_factory_class(&mut properties, KIND, "amqp", FactoryClass::Netty);
        set_factory_class(&mut properties, KIND, "amqp", FactoryClass::InVm);

        assert_eq!(
            properties,
            vec![
                "acceptorConfigurations.amqp.factoryClassName=org.apache.activemq.artemis.core.remoting.impl.invm.InVMAcceptorFactory"
                    .to_owned()
            ]
        );
    }

    #[test]
    fn connector_factory_class_uses_connector_namespace() {
        let mut properties = Vec::new();

        set_factory_class(
            &mut properties,
            EndpointKind::Connector,
            "peer",
            FactoryClass::Netty,
        );

        assert_eq!(
            properties,
            vec![
                "connectorConfigurations.peer.factoryClassName=org.apache.activemq.artemis.core.remoting.impl.netty.NettyConnectorFactory"
                    .to_owned()
            ]
        );
    }

    #[test]
    fn params_are_replaced_wholesale() {
        let mut properties = Vec::new();

        set_params(
            &mut properties,
            KIND,
            "amqp",
            &BTreeMap::from([
                ("tcpSendBufferSize".to_owned(), "1048576".to_owned()),
                ("sslKind".to_owned(), "openssl".to_owned()),
            ]),
        );
        // Dropping a key from the map must delete its line.
        set_params(
            &mut properties,
            KIND,
            "amqp",
            &BTreeMap::from([("sslKind".to_owned(), "jdk".to_owned())]),
        );

        assert_eq!(
            properties,
            vec!["acceptorConfigurations.amqp.params.sslKind=jdk".to_owned()]
        );
    }

    #[test]
    fn rename_moves_every_line_of_the_member() {
        let mut properties = Vec::new();
        set_factory_class(&mut properties, KIND, "amqp", FactoryClass::Netty);
        set_params(
            &mut properties,
            KIND,
            "amqp",
            &BTreeMap::from([("sslKind".to_owned(), "openssl".to_owned())]),
        );
        set_factory_class(&mut properties, KIND, "other", FactoryClass::Netty);

        rename_member(&mut properties, KIND, "amqp", "core");

        assert!(
            properties
                .iter()
                .all(|line| !line.starts_with("acceptorConfigurations.amqp."))
        );
        assert!(properties.contains(
            &"acceptorConfigurations.core.params.sslKind=openssl".to_owned()
        ));
        // Untouched members keep their lines.
        assert!(properties.iter().any(|line| line.starts_with("acceptorConfigurations.other.")));
    }

    #[test]
    fn remove_cascades_all_lines() {
        let mut properties = Vec::new();
        set_factory_class(&mut properties, KIND, "amqp", FactoryClass::Netty);
        set_params(
            &mut properties,
            KIND,
            "amqp",
            &BTreeMap::from([("a".to_owned(), "1".to_owned())]),
        );

        remove_member(&mut properties, KIND, "amqp");

        assert!(properties.is_empty());
    }

    #[test]
    fn members_with_shared_name_prefix_stay_apart() {
        let mut properties = Vec::new();
        set_factory_class(&mut properties, KIND, "amqp", FactoryClass::Netty);
        set_factory_class(&mut properties, KIND, "amqp-tls", FactoryClass::Netty);

        remove_member(&mut properties, KIND, "amqp");

        assert_eq!(properties.len(), 1);
        assert!(properties[0].starts_with("acceptorConfigurations.amqp-tls."));
    }
}
