//! Base reducer: acceptor and connector CRUD, console configuration,
//! replica count, credentials and the certificate-based ingress lifecycle.

use artemis_crd::{
    broker::{ActiveMQArtemis, DEFAULT_PROTOCOLS, Endpoint, EndpointKind},
    validation,
};
use tracing::{debug, warn};

use crate::{
    action::{Action, ConsoleAction, EndpointAction, V1Action},
    allocator, ingress, properties,
    state::ConfigurationState,
};

/// Tail of the reducer chain. An operation not owned here either was meant
/// for the global dispatcher or is unknown; both indicate a dispatch bug
/// upstream, so it is dropped with a warning.
pub(super) fn reduce(state: ConfigurationState, action: Action) -> ConfigurationState {
    match action {
        Action::V1(action) => apply(state, action),
        action => {
            warn!(?action, "operation fell through the reducer chain unhandled");
            state
        }
    }
}

fn apply(mut state: ConfigurationState, action: V1Action) -> ConfigurationState {
    let resource = &mut state.resource;
    match action {
        V1Action::SetBrokerName(name) => set_broker_name(resource, name),
        V1Action::SetNamespace(namespace) => set_namespace(resource, namespace),
        V1Action::SetIngressDomain(domain) => set_ingress_domain(resource, domain),
        V1Action::SetReplicas(size) => set_replicas(resource, size),
        V1Action::Console(action) => console(resource, action),
        V1Action::Endpoint { kind, action } => endpoint(resource, kind, action),
        V1Action::EnablePemIngress { acceptor, issuer } => {
            ingress::enable(resource, &acceptor, &issuer);
        }
        V1Action::DisablePemIngress { acceptor } => ingress::disable(resource, &acceptor),
    }
    state
}

/// Applies an edit that changes one of the ingress derivation inputs and
/// re-derives the generated view afterwards, with the acceptor/template
/// pairing captured while the old derivations still held.
fn with_identity_edit(resource: &mut ActiveMQArtemis, edit: impl FnOnce(&mut ActiveMQArtemis)) {
    let pairing = ingress::capture_pairing(resource);
    edit(resource);
    ingress::resync(resource, &pairing);
}

/// Membership in the generated-ingress set may have changed without any
/// identity input moving; re-derive against the current pairing.
fn refresh_generated_view(resource: &mut ActiveMQArtemis) {
    let pairing = ingress::capture_pairing(resource);
    ingress::resync(resource, &pairing);
}

fn set_broker_name(resource: &mut ActiveMQArtemis, name: String) {
    if let Err(error) = validation::is_valid_name(&name) {
        debug!(%error, "rejecting broker name");
        return;
    }
    with_identity_edit(resource, |resource| resource.metadata.name = Some(name));
}

fn set_namespace(resource: &mut ActiveMQArtemis, namespace: String) {
    if let Err(error) = validation::is_valid_name(&namespace) {
        debug!(%error, "rejecting namespace");
        return;
    }
    with_identity_edit(resource, |resource| {
        resource.metadata.namespace = Some(namespace);
    });
}

fn set_ingress_domain(resource: &mut ActiveMQArtemis, domain: String) {
    with_identity_edit(resource, |resource| {
        resource.spec.ingress_domain = (!domain.is_empty()).then_some(domain);
    });
}

fn set_replicas(resource: &mut ActiveMQArtemis, size: i32) {
    with_identity_edit(resource, |resource| {
        resource.spec.deployment_plan.size = size;
    });
}

fn console(resource: &mut ActiveMQArtemis, action: ConsoleAction) {
    let spec = &mut resource.spec;
    match action {
        ConsoleAction::SetExpose(expose) => spec.console.expose = Some(expose),
        ConsoleAction::SetExposeMode(mode) => spec.console.expose_mode = Some(mode),
        ConsoleAction::SetSslEnabled(enabled) => spec.console.ssl_enabled = Some(enabled),
        ConsoleAction::SetSslSecret(secret) => spec.console.ssl_secret = secret,
        ConsoleAction::SetUseClientAuth(use_client_auth) => {
            spec.console.use_client_auth = Some(use_client_auth);
        }
        ConsoleAction::SetCredentials { user, password } => {
            if user.is_empty() || password.is_empty() {
                debug!("rejecting empty console credentials");
                return;
            }
            spec.admin_user = Some(user);
            spec.admin_password = Some(password);
        }
    }
}

fn collection(resource: &ActiveMQArtemis, kind: EndpointKind) -> &[Endpoint] {
    match kind {
        EndpointKind::Acceptor => &resource.spec.acceptors,
        EndpointKind::Connector => &resource.spec.connectors,
    }
}

fn collection_mut(resource: &mut ActiveMQArtemis, kind: EndpointKind) -> &mut Vec<Endpoint> {
    match kind {
        EndpointKind::Acceptor => &mut resource.spec.acceptors,
        EndpointKind::Connector => &mut resource.spec.connectors,
    }
}

fn member_mut<'a>(
    resource: &'a mut ActiveMQArtemis,
    kind: EndpointKind,
    name: &str,
) -> Option<&'a mut Endpoint> {
    collection_mut(resource, kind)
        .iter_mut()
        .find(|member| member.name == name)
}

fn member_exists(resource: &ActiveMQArtemis, kind: EndpointKind, name: &str) -> bool {
    collection(resource, kind)
        .iter()
        .any(|member| member.name == name)
}

fn endpoint(resource: &mut ActiveMQArtemis, kind: EndpointKind, action: EndpointAction) {
    match action {
        EndpointAction::Add => add(resource, kind),
        EndpointAction::Delete { name } => delete(resource, kind, &name),
        EndpointAction::SetName { name, new_name } => rename(resource, kind, &name, new_name),
        EndpointAction::SetPort { name, port } => {
            // Manually typed ports may collide; only allocation avoids that.
            if let Some(member) = member_mut(resource, kind, &name) {
                member.port = port;
            }
        }
        EndpointAction::SetProtocols { name, protocols } => {
            if let Some(member) = member_mut(resource, kind, &name) {
                member.protocols = protocols;
            }
        }
        EndpointAction::SetBindToAllInterfaces { name, bind } => {
            if let Some(member) = member_mut(resource, kind, &name) {
                member.bind_to_all_interfaces = Some(bind);
            }
        }
        EndpointAction::SetFactoryClass { name, class } => {
            if member_exists(resource, kind, &name) {
                properties::set_factory_class(
                    &mut resource.spec.broker_properties,
                    kind,
                    &name,
                    class,
                );
            }
        }
        EndpointAction::SetOtherParams { name, params } => {
            if member_exists(resource, kind, &name) {
                properties::set_params(&mut resource.spec.broker_properties, kind, &name, &params);
            }
        }
        EndpointAction::SetSslEnabled { name, enabled } => {
            let Some(member) = member_mut(resource, kind, &name) else {
                return;
            };
            member.ssl_enabled = Some(enabled);
            if kind == EndpointKind::Acceptor {
                refresh_generated_view(resource);
            }
        }
        EndpointAction::SetSslSecret { name, secret } => {
            let Some(member) = member_mut(resource, kind, &name) else {
                return;
            };
            member.ssl_secret = secret;
            if kind == EndpointKind::Acceptor {
                refresh_generated_view(resource);
            }
        }
        EndpointAction::SetTrustSecret { name, secret } => {
            if let Some(member) = member_mut(resource, kind, &name) {
                member.trust_secret = secret;
            }
        }
        EndpointAction::SetExpose { name, expose } => {
            if let Some(member) = member_mut(resource, kind, &name) {
                member.expose = Some(expose);
            }
        }
        EndpointAction::SetExposeMode { name, mode } => {
            let Some(member) = member_mut(resource, kind, &name) else {
                return;
            };
            member.expose_mode = Some(mode);
            if kind == EndpointKind::Acceptor {
                refresh_generated_view(resource);
            }
        }
        EndpointAction::SetIngressHost { name, host } => {
            if let Some(member) = member_mut(resource, kind, &name) {
                member.ingress_host = (!host.is_empty()).then_some(host);
            }
        }
    }
}

fn add(resource: &mut ActiveMQArtemis, kind: EndpointKind) {
    let collection = collection_mut(resource, kind);
    let name = allocator::next_name(kind, collection);
    let port = allocator::next_port(collection);
    debug!(kind = %kind, %name, port, "adding endpoint");

    collection.push(Endpoint {
        name,
        port,
        protocols: DEFAULT_PROTOCOLS.to_owned(),
        ..Endpoint::default()
    });
}

/// Removes the member together with everything attributable to it: its
/// property lines and, for acceptors, its routing template.
fn delete(resource: &mut ActiveMQArtemis, kind: EndpointKind, name: &str) {
    let collection = collection_mut(resource, kind);
    let len_before = collection.len();
    collection.retain(|member| member.name != name);
    if collection.len() == len_before {
        return;
    }

    properties::remove_member(&mut resource.spec.broker_properties, kind, name);
    if kind == EndpointKind::Acceptor {
        refresh_generated_view(resource);
    }
}

fn rename(resource: &mut ActiveMQArtemis, kind: EndpointKind, name: &str, new_name: String) {
    {
        let collection = collection(resource, kind);
        if !collection.iter().any(|member| member.name == name) {
            return;
        }
        if collection.iter().any(|member| member.name == new_name) {
            debug!(kind = %kind, name, %new_name, "rejecting rename to a taken name");
            return;
        }
    }
    if let Err(error) = validation::is_valid_name(&new_name) {
        debug!(%error, "rejecting endpoint name");
        return;
    }

    properties::rename_member(&mut resource.spec.broker_properties, kind, name, &new_name);

    match kind {
        EndpointKind::Acceptor => with_identity_edit(resource, |resource| {
            if let Some(member) = resource
                .spec
                .acceptors
                .iter_mut()
                .find(|member| member.name == name)
            {
                member.name = new_name;
            }
        }),
        EndpointKind::Connector => {
            if let Some(member) = member_mut(resource, kind, name) {
                member.name = new_name;
            }
        }
    }
}
