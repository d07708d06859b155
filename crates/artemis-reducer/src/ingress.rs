//! Certificate-based ingress exposure for acceptors.
//!
//! Activating it for an acceptor pins the acceptor's TLS fields to generated
//! values and derives one routing [`ResourceTemplate`] whose selector and TLS
//! host list are pure functions of five inputs: the resource name, the
//! acceptor name, the namespace, the ingress domain and the replica count.
//!
//! Rather than patching templates from every setter that touches one of the
//! inputs, the base reducer brackets such mutations with
//! [`capture_pairing`]/[`resync`]: capture which template belongs to which
//! acceptor while the old derivations still hold, mutate, then re-derive the
//! whole view. Acceptors that stopped qualifying lose their template, and a
//! qualifying acceptor that lost its template (a hand-edited document can do
//! that) gets a fresh one.

use std::collections::BTreeMap;

use artemis_crd::broker::{
    ActiveMQArtemis, Endpoint, ExposeMode, ResourceTemplate, TemplatePatch, TemplatePatchSpec,
    TemplateSelector, TemplateTls,
};
use tracing::debug;

/// Host pattern assigned to exposed acceptors. The `$(...)` placeholders are
/// substituted by the operator at deployment time, never by this crate.
pub const INGRESS_HOST_TEMPLATE: &str =
    "ing.$(ITEM_NAME).$(CR_NAME)-$(BROKER_ORDINAL).$(CR_NAMESPACE).$(INGRESS_DOMAIN)";

/// Annotation on a generated template naming the cert-manager issuer.
pub const ISSUER_ANNOTATION: &str = "cert-manager.io/issuer";

const CERT_SECRET_SUFFIX: &str = "-svc-ing-ptls";

/// The identity inputs of every derivation, snapshotted from the resource so
/// derived strings can be rebuilt while the acceptor list is borrowed
/// mutably.
struct Identity {
    cr_name: String,
    namespace: String,
    domain: String,
    size: i32,
}

impl Identity {
    fn of(resource: &ActiveMQArtemis) -> Self {
        Self {
            cr_name: resource.metadata.name.clone().unwrap_or_default(),
            namespace: resource.metadata.namespace.clone().unwrap_or_default(),
            domain: resource.spec.ingress_domain.clone().unwrap_or_default(),
            size: resource.spec.deployment_plan.size,
        }
    }
}

/// Name of the secret holding the generated server certificate.
pub(crate) fn cert_secret_name(cr_name: &str, acceptor: &str) -> String {
    format!("{cr_name}-{acceptor}-0{CERT_SECRET_SUFFIX}")
}

/// Name of the generated ingress the routing template selects.
pub(crate) fn selector_name(cr_name: &str, acceptor: &str) -> String {
    format!("{cr_name}-{acceptor}-0-svc-ing")
}

fn ordinal_host(id: &Identity, acceptor: &str, ordinal: i32) -> String {
    format!(
        "ing.{acceptor}.{cr_name}-{ordinal}.{namespace}.{domain}",
        cr_name = id.cr_name,
        namespace = id.namespace,
        domain = id.domain,
    )
}

/// Whether the acceptor currently has certificate-based ingress exposure
/// active. The generated secret suffix doubles as the marker, so the answer
/// survives a wholesale document replacement.
pub(crate) fn is_pem_generated(acceptor: &Endpoint) -> bool {
    acceptor.ssl_enabled == Some(true)
        && acceptor.expose_mode == Some(ExposeMode::Ingress)
        && acceptor
            .ssl_secret
            .as_deref()
            .is_some_and(|secret| secret.ends_with(CERT_SECRET_SUFFIX))
}

fn routing_template(
    id: &Identity,
    acceptor: &str,
    annotations: Option<BTreeMap<String, String>>,
) -> ResourceTemplate {
    let hosts = (0..id.size.max(0))
        .map(|ordinal| ordinal_host(id, acceptor, ordinal))
        .collect();

    ResourceTemplate {
        selector: TemplateSelector {
            name: selector_name(&id.cr_name, acceptor),
        },
        annotations,
        patch: TemplatePatch {
            spec: TemplatePatchSpec {
                tls: vec![TemplateTls { hosts }],
            },
        },
    }
}

/// For each acceptor, the position of the template it owns — exact while the
/// templates still match the derivations of the *current* identity. Call
/// before a mutation that changes any identity input.
pub(crate) fn capture_pairing(resource: &ActiveMQArtemis) -> Vec<Option<usize>> {
    let cr_name = resource.metadata.name.as_deref().unwrap_or_default();
    let templates = resource.spec.resource_templates.as_deref().unwrap_or_default();

    resource
        .spec
        .acceptors
        .iter()
        .map(|acceptor| {
            let expected = selector_name(cr_name, &acceptor.name);
            templates
                .iter()
                .position(|template| template.selector.name == expected)
        })
        .collect()
}

/// Re-derives the whole ingress view: the generated secret of every
/// qualifying acceptor plus its template's selector and host list. Templates
/// whose owner is gone or no longer qualifies are dropped; the field goes
/// back to absent when nothing is left.
///
/// `pairing` carries each acceptor's template as captured before the
/// mutation, so annotations (the issuer) survive identity changes.
pub(crate) fn resync(resource: &mut ActiveMQArtemis, pairing: &[Option<usize>]) {
    let id = Identity::of(resource);
    let old_templates = resource
        .spec
        .resource_templates
        .take()
        .unwrap_or_default();

    let mut templates = Vec::new();
    for (index, acceptor) in resource.spec.acceptors.iter_mut().enumerate() {
        if !is_pem_generated(acceptor) {
            continue;
        }

        acceptor.ssl_secret = Some(cert_secret_name(&id.cr_name, &acceptor.name));

        let annotations = pairing
            .get(index)
            .copied()
            .flatten()
            .and_then(|slot| old_templates.get(slot))
            .and_then(|template| template.annotations.clone());
        templates.push(routing_template(&id, &acceptor.name, annotations));
    }

    resource.spec.resource_templates = (!templates.is_empty()).then_some(templates);
}

/// Activates certificate-based ingress exposure for `acceptor_name`.
pub(crate) fn enable(resource: &mut ActiveMQArtemis, acceptor_name: &str, issuer: &str) {
    let id = Identity::of(resource);
    let Some(acceptor) = resource
        .spec
        .acceptors
        .iter_mut()
        .find(|acceptor| acceptor.name == acceptor_name)
    else {
        debug!(
            acceptor = acceptor_name,
            "ignoring certificate ingress activation for unknown acceptor"
        );
        return;
    };

    acceptor.ssl_enabled = Some(true);
    acceptor.expose_mode = Some(ExposeMode::Ingress);
    acceptor.ingress_host = Some(INGRESS_HOST_TEMPLATE.to_owned());
    acceptor.ssl_secret = Some(cert_secret_name(&id.cr_name, acceptor_name));

    let pairing = capture_pairing(resource);
    resync(resource, &pairing);

    // Record the issuer on the (re)created template.
    let selector = selector_name(&id.cr_name, acceptor_name);
    if let Some(template) = resource
        .spec
        .resource_templates
        .as_mut()
        .and_then(|templates| {
            templates
                .iter_mut()
                .find(|template| template.selector.name == selector)
        })
    {
        template.annotations = Some(BTreeMap::from([(
            ISSUER_ANNOTATION.to_owned(),
            issuer.to_owned(),
        )]));
    }
}

/// Deactivates certificate-based ingress exposure; a second call on an
/// already-deactivated acceptor changes nothing.
pub(crate) fn disable(resource: &mut ActiveMQArtemis, acceptor_name: &str) {
    let Some(acceptor) = resource
        .spec
        .acceptors
        .iter_mut()
        .find(|acceptor| acceptor.name == acceptor_name)
    else {
        return;
    };

    acceptor.ssl_enabled = None;
    acceptor.ssl_secret = None;

    let pairing = capture_pairing(resource);
    resync(resource, &pairing);
}

#[cfg(test)]
mod tests {
    use artemis_crd::broker;

    use super::*;

    fn resource_with_acceptor(name: &str) -> ActiveMQArtemis {
        let mut resource = broker::default_resource("ns");
        resource.spec.acceptors.push(Endpoint {
            name: name.to_owned(),
            port: 5555,
            protocols: "ALL".to_owned(),
            ..Endpoint::default()
        });
        resource
    }

    fn hosts(resource: &ActiveMQArtemis) -> Vec<String> {
        resource.spec.resource_templates.as_deref().unwrap()[0].patch.spec.tls[0]
            .hosts
            .clone()
    }

    #[test]
    fn enable_derives_secret_template_and_host() {
        let mut resource = resource_with_acceptor("acceptors0");
        resource.spec.ingress_domain = Some("apps.example.com".to_owned());

        enable(&mut resource, "acceptors0", "issuer-a");

        let acceptor = &resource.spec.acceptors[0];
        assert_eq!(acceptor.ssl_enabled, Some(true));
        assert_eq!(acceptor.expose_mode, Some(ExposeMode::Ingress));
        assert_eq!(acceptor.ingress_host.as_deref(), Some(INGRESS_HOST_TEMPLATE));
        assert_eq!(
            acceptor.ssl_secret.as_deref(),
            Some("ex-aao-acceptors0-0-svc-ing-ptls")
        );

        let templates = resource.spec.resource_templates.as_deref().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].selector.name, "ex-aao-acceptors0-0-svc-ing");
        assert_eq!(
            templates[0].annotations.as_ref().unwrap()[ISSUER_ANNOTATION],
            "issuer-a"
        );
        assert_eq!(
            hosts(&resource),
            ["ing.acceptors0.ex-aao-0.ns.apps.example.com"]
        );
    }

    #[test]
    fn enable_for_unknown_acceptor_changes_nothing() {
        let mut resource = resource_with_acceptor("acceptors0");
        let before = resource.clone();

        enable(&mut resource, "missing", "issuer-a");

        assert_eq!(resource, before);
    }

    #[test]
    fn resync_follows_resource_rename() {
        let mut resource = resource_with_acceptor("acceptors0");
        enable(&mut resource, "acceptors0", "issuer-a");

        let pairing = capture_pairing(&resource);
        resource.metadata.name = Some("bro".to_owned());
        resync(&mut resource, &pairing);

        let acceptor = &resource.spec.acceptors[0];
        assert_eq!(
            acceptor.ssl_secret.as_deref(),
            Some("bro-acceptors0-0-svc-ing-ptls")
        );
        let templates = resource.spec.resource_templates.as_deref().unwrap();
        assert_eq!(templates[0].selector.name, "bro-acceptors0-0-svc-ing");
        // The issuer annotation survives the re-derivation.
        assert_eq!(
            templates[0].annotations.as_ref().unwrap()[ISSUER_ANNOTATION],
            "issuer-a"
        );
    }

    #[test]
    fn resync_scales_hosts_with_the_replica_count() {
        let mut resource = resource_with_acceptor("acceptors0");
        enable(&mut resource, "acceptors0", "issuer-a");

        let pairing = capture_pairing(&resource);
        resource.spec.deployment_plan.size = 3;
        resync(&mut resource, &pairing);

        assert_eq!(
            hosts(&resource),
            [
                "ing.acceptors0.ex-aao-0.ns.",
                "ing.acceptors0.ex-aao-1.ns.",
                "ing.acceptors0.ex-aao-2.ns.",
            ]
        );
    }

    #[test]
    fn disable_is_idempotent_and_clears_the_template_field() {
        let mut resource = resource_with_acceptor("acceptors0");
        enable(&mut resource, "acceptors0", "issuer-a");

        disable(&mut resource, "acceptors0");
        let after_first = resource.clone();
        disable(&mut resource, "acceptors0");

        assert_eq!(resource, after_first);
        assert_eq!(resource.spec.acceptors[0].ssl_enabled, None);
        assert_eq!(resource.spec.acceptors[0].ssl_secret, None);
        assert!(resource.spec.resource_templates.is_none());
    }

    #[test]
    fn only_the_disabled_acceptor_loses_its_template() {
        let mut resource = resource_with_acceptor("acceptors0");
        resource.spec.acceptors.push(Endpoint {
            name: "acceptors1".to_owned(),
            port: 5556,
            ..Endpoint::default()
        });
        enable(&mut resource, "acceptors0", "issuer-a");
        enable(&mut resource, "acceptors1", "issuer-b");

        disable(&mut resource, "acceptors0");

        let templates = resource.spec.resource_templates.as_deref().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].selector.name, "ex-aao-acceptors1-0-svc-ing");
        assert_eq!(
            templates[0].annotations.as_ref().unwrap()[ISSUER_ANNOTATION],
            "issuer-b"
        );
    }

    #[test]
    fn manual_ssl_secret_takes_the_acceptor_out_of_generation() {
        let mut resource = resource_with_acceptor("acceptors0");
        enable(&mut resource, "acceptors0", "issuer-a");

        resource.spec.acceptors[0].ssl_secret = Some("my-own-secret".to_owned());
        let pairing = capture_pairing(&resource);
        resync(&mut resource, &pairing);

        assert!(resource.spec.resource_templates.is_none());
        assert_eq!(
            resource.spec.acceptors[0].ssl_secret.as_deref(),
            Some("my-own-secret")
        );
    }
}
