#![allow(clippy::unwrap_used)]
// Integration tests for the resource handlers against a wiremock grid master.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nios_api::{TransportConfig, WapiClient};
use nios_core::{
    AttrValue, AttributeMap, DataSourceQuery, DhcpOption, FixedAddress, FuncCall,
    INTERNAL_ID_KEY, NiosProvider, OptionDefinition, PlanValue, ReadOutcome,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, NiosProvider) {
    let server = MockServer::start().await;
    let client = WapiClient::new(
        &server.uri(),
        "2.13.6",
        "admin",
        SecretString::from("infoblox".to_owned()),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, NiosProvider::with_client(client))
}

fn wapi_path(suffix: &str) -> String {
    format!("/wapi/v2.13.6/{suffix}")
}

const FA_REF: &str = "fixedaddress/ZG5zLmZpeGVkX2FkZHJlc3MkMTAuMC4wLjUuMC4u:10.0.0.5/default";
const FA_REF_RENAMED: &str = "fixedaddress/ZG5zLmZpeGVkX2FkZHJlc3MkMTAuMC4wLjYuMC4u:10.0.0.6/default";

fn fixed_address_body(reference: &str, extattrs: Value) -> Value {
    json!({
        "_ref": reference,
        "ipv4addr": "10.0.0.5",
        "mac": "aa:bb:cc:dd:ee:ff",
        "match_client": "MAC_ADDRESS",
        "network_view": "default",
        "network": "10.0.0.0/24",
        "options": [
            { "name": "dhcp-lease-time", "num": 51, "value": "43200", "use_option": false },
            { "name": "routers", "num": 3, "value": "10.0.0.1", "use_option": true }
        ],
        "use_options": false,
        "extattrs": extattrs
    })
}

fn planned_fixed_address() -> FixedAddress {
    FixedAddress {
        ipv4addr: Some("10.0.0.5".into()),
        mac: Some("aa:bb:cc:dd:ee:ff".into()),
        options: PlanValue::Known(vec![DhcpOption::named("routers", "10.0.0.1")]),
        extattrs: Some(AttributeMap::from([("Site", "NYC")])),
        ..FixedAddress::default()
    }
}

fn prior_state(reference: &str) -> FixedAddress {
    let mut all = AttributeMap::from([("Site", "NYC")]);
    all.insert_value("CreatedBy", AttrValue::inherited("system"));
    all.insert_value(INTERNAL_ID_KEY, AttrValue::inherited("abc-123"));
    FixedAddress {
        reference: Some(reference.into()),
        extattrs_all: Some(all),
        ..planned_fixed_address()
    }
}

async fn request_bodies(server: &MockServer, verb: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == verb)
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}

// ── Create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_tags_object_and_hides_inherited_attrs() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path(wapi_path("fixedaddress")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "result": fixed_address_body(FA_REF, json!({
                "Site": { "value": "NYC" },
                "CreatedBy": { "value": "system", "inheritance_source": { "_ref": "network/x" } },
                INTERNAL_ID_KEY: { "value": "abc-123" }
            }))
        })))
        .mount(&server)
        .await;

    let outcome = provider
        .fixed_addresses()
        .create(planned_fixed_address())
        .await;
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    let state = outcome.value.unwrap();

    assert_eq!(state.reference.as_deref(), Some(FA_REF));
    assert_eq!(state.extattrs, Some(AttributeMap::from([("Site", "NYC")])));
    let all = state.extattrs_all.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.get(INTERNAL_ID_KEY).unwrap().inherited);
    assert!(!all.get("Site").unwrap().inherited);

    // Only the declared option survives; the server-added lease time is dropped.
    assert_eq!(state.options.known().map(Vec::len), Some(1));
    assert_eq!(state.network_view.as_deref(), Some("default"));

    let posted = request_bodies(&server, "POST").await;
    let sent_attrs = &posted[0]["extattrs"];
    assert_eq!(sent_attrs["Site"]["value"], json!("NYC"));
    assert!(sent_attrs[INTERNAL_ID_KEY]["value"].is_string());
    assert_eq!(posted[0]["match_client"], json!("MAC_ADDRESS"));
}

#[tokio::test]
async fn test_create_reports_inconsistent_attribute() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path(wapi_path("fixedaddress")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "result": fixed_address_body(FA_REF, json!({
                "Site": { "value": "nyc" },
                INTERNAL_ID_KEY: { "value": "abc-123" }
            }))
        })))
        .mount(&server)
        .await;

    let outcome = provider
        .fixed_addresses()
        .create(planned_fixed_address())
        .await;

    assert!(outcome.value.is_none());
    let errors: Vec<_> = outcome.diagnostics.errors().collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].detail.contains("\"Site\""));
}

#[tokio::test]
async fn test_create_without_extattrs_in_response_persists_nothing() {
    let (server, provider) = setup().await;

    let mut body = fixed_address_body(FA_REF, json!({}));
    body.as_object_mut().unwrap().remove("extattrs");
    Mock::given(method("POST"))
        .and(path(wapi_path("fixedaddress")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "result": body })))
        .mount(&server)
        .await;

    let outcome = provider
        .fixed_addresses()
        .create(planned_fixed_address())
        .await;

    assert!(!outcome.is_ok());
    assert!(outcome.diagnostics.has_errors());
    let errors: Vec<_> = outcome.diagnostics.errors().collect();
    assert!(errors[0].detail.contains("extensible attributes"), "{errors:?}");
}

#[tokio::test]
async fn test_create_rejects_invalid_plan_without_calling_server() {
    let (server, provider) = setup().await;

    let outcome = provider
        .fixed_addresses()
        .create(FixedAddress {
            mac: None,
            ..planned_fixed_address()
        })
        .await;

    assert!(outcome.value.is_none());
    assert!(outcome.diagnostics.has_errors());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_option_definition_create_sends_no_extattrs() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path(wapi_path("dhcpoptiondefinition")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "result": {
                "_ref": "dhcpoptiondefinition/ZG5z:tftp-servers/DHCP",
                "name": "tftp-servers",
                "code": 150,
                "space": "DHCP",
                "type": "array of ip-address"
            }
        })))
        .mount(&server)
        .await;

    let outcome = provider
        .option_definitions()
        .create(OptionDefinition {
            name: Some("tftp-servers".into()),
            code: Some(150),
            option_type: Some("array of ip-address".into()),
            ..OptionDefinition::default()
        })
        .await;

    let state = outcome.value.unwrap();
    assert_eq!(state.space.as_deref(), Some("DHCP"));
    let posted = request_bodies(&server, "POST").await;
    assert!(posted[0].get("extattrs").is_none());
}

// ── Read ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_read_refreshes_by_reference() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": fixed_address_body(FA_REF, json!({
                "Site": { "value": "NYC" },
                "Owner": { "value": "neteng" },
                INTERNAL_ID_KEY: { "value": "abc-123" }
            }))
        })))
        .mount(&server)
        .await;

    let outcome = provider.fixed_addresses().read(prior_state(FA_REF)).await;
    let state = outcome.value.unwrap().present().unwrap();

    assert_eq!(state.extattrs, Some(AttributeMap::from([("Site", "NYC")])));
    assert!(state.extattrs_all.unwrap().get("Owner").unwrap().inherited);
}

#[tokio::test]
async fn test_read_follows_internal_id_after_rename() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "Error": "AdmConDataNotFoundError: Reference not found",
            "code": "Client.Ibap.Data.NotFound",
            "text": "Reference not found"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(wapi_path("fixedaddress")))
        .and(query_param("*Terraform Internal ID", "abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [fixed_address_body(FA_REF_RENAMED, json!({
                "Site": { "value": "NYC" },
                INTERNAL_ID_KEY: { "value": "abc-123" }
            }))]
        })))
        .mount(&server)
        .await;

    let outcome = provider.fixed_addresses().read(prior_state(FA_REF)).await;
    let state = outcome.value.unwrap().present().unwrap();

    assert_eq!(state.reference.as_deref(), Some(FA_REF_RENAMED));
}

#[tokio::test]
async fn test_read_reassociates_when_reference_points_elsewhere() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": fixed_address_body(FA_REF, json!({
                INTERNAL_ID_KEY: { "value": "someone-else" }
            }))
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(wapi_path("fixedaddress")))
        .and(query_param("*Terraform Internal ID", "abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [fixed_address_body(FA_REF_RENAMED, json!({
                "Site": { "value": "NYC" },
                INTERNAL_ID_KEY: { "value": "abc-123" }
            }))]
        })))
        .mount(&server)
        .await;

    let outcome = provider.fixed_addresses().read(prior_state(FA_REF)).await;
    let state = outcome.value.unwrap().present().unwrap();

    assert_eq!(state.reference.as_deref(), Some(FA_REF_RENAMED));
    assert_eq!(
        state.extattrs_all.unwrap().value(INTERNAL_ID_KEY),
        Some("abc-123")
    );
}

#[tokio::test]
async fn test_read_reports_removed_when_id_is_gone() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "Error": "AdmConDataNotFoundError: Reference not found",
            "code": "Client.Ibap.Data.NotFound",
            "text": "Reference not found"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(wapi_path("fixedaddress")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .mount(&server)
        .await;

    let outcome = provider.fixed_addresses().read(prior_state(FA_REF)).await;

    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.value, Some(ReadOutcome::Removed));
}

#[tokio::test]
async fn test_read_refuses_ambiguous_internal_id() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "Error": "AdmConDataNotFoundError: Reference not found",
            "code": "Client.Ibap.Data.NotFound",
            "text": "Reference not found"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(wapi_path("fixedaddress")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                fixed_address_body(FA_REF_RENAMED, json!({ INTERNAL_ID_KEY: { "value": "abc-123" } })),
                fixed_address_body(FA_REF, json!({ INTERNAL_ID_KEY: { "value": "abc-123" } }))
            ]
        })))
        .mount(&server)
        .await;

    let outcome = provider.fixed_addresses().read(prior_state(FA_REF)).await;

    assert!(outcome.value.is_none());
    assert!(outcome.diagnostics.has_errors());
}

// ── Update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_carries_inherited_attrs_and_drops_removed_ones() {
    let (server, provider) = setup().await;

    Mock::given(method("PUT"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": fixed_address_body(FA_REF, json!({
                "Site": { "value": "LON" },
                "CreatedBy": { "value": "system" },
                INTERNAL_ID_KEY: { "value": "abc-123" }
            }))
        })))
        .mount(&server)
        .await;

    let mut prior = prior_state(FA_REF);
    prior.extattrs = Some(AttributeMap::from([("Site", "NYC"), ("Owner", "neteng")]));
    if let Some(all) = prior.extattrs_all.as_mut() {
        all.insert("Owner", "neteng");
    }
    let plan = FixedAddress {
        extattrs: Some(AttributeMap::from([("Site", "LON")])),
        ..planned_fixed_address()
    };

    let outcome = provider.fixed_addresses().update(plan, &prior).await;
    let state = outcome.value.unwrap();
    assert_eq!(state.extattrs, Some(AttributeMap::from([("Site", "LON")])));

    let put = request_bodies(&server, "PUT").await;
    let sent = put[0]["extattrs"].as_object().unwrap();
    assert_eq!(sent["Site"]["value"], json!("LON"));
    assert_eq!(sent["CreatedBy"]["value"], json!("system"));
    assert_eq!(sent[INTERNAL_ID_KEY]["value"], json!("abc-123"));
    assert!(!sent.contains_key("Owner"));
}

#[tokio::test]
async fn test_update_keeps_allocated_address() {
    let (server, provider) = setup().await;

    Mock::given(method("PUT"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": fixed_address_body(FA_REF, json!({
                "Site": { "value": "NYC" },
                INTERNAL_ID_KEY: { "value": "abc-123" }
            }))
        })))
        .mount(&server)
        .await;

    let allocate = Some(FuncCall::next_available_ip("10.0.0.0/24", "default"));
    let prior = FixedAddress {
        func_call: allocate.clone(),
        ..prior_state(FA_REF)
    };
    let plan = FixedAddress {
        ipv4addr: None,
        func_call: allocate.clone(),
        comment: Some("printer".into()),
        ..planned_fixed_address()
    };

    let outcome = provider.fixed_addresses().update(plan, &prior).await;
    let state = outcome.value.unwrap();
    assert_eq!(state.ipv4addr.as_deref(), Some("10.0.0.5"));
    assert_eq!(state.func_call, allocate);

    let put = request_bodies(&server, "PUT").await;
    assert_eq!(put[0]["ipv4addr"], json!("10.0.0.5"));
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_treats_missing_object_as_deleted() {
    let (server, provider) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "Error": "AdmConDataNotFoundError: Reference not found",
            "code": "Client.Ibap.Data.NotFound",
            "text": "Reference not found"
        })))
        .mount(&server)
        .await;

    let outcome = provider.fixed_addresses().delete(&prior_state(FA_REF)).await;
    assert!(outcome.is_ok());
    assert!(outcome.diagnostics.is_empty());
}

#[tokio::test]
async fn test_delete_surfaces_server_errors() {
    let (server, provider) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "Error": "AdmConProtoError: object is locked",
            "code": "Client.Ibap.Proto",
            "text": "object is locked"
        })))
        .mount(&server)
        .await;

    let outcome = provider.fixed_addresses().delete(&prior_state(FA_REF)).await;
    assert!(!outcome.is_ok());
}

// ── Import ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_import_tags_object_and_declares_own_attrs() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": fixed_address_body(FA_REF, json!({
                "Site": { "value": "NYC" },
                "Region": { "value": "EMEA", "inheritance_source": { "_ref": "network/x" } }
            }))
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(wapi_path(FA_REF)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": fixed_address_body(FA_REF, json!({
                "Site": { "value": "NYC" },
                "Region": { "value": "EMEA", "inheritance_source": { "_ref": "network/x" } },
                INTERNAL_ID_KEY: { "value": "fresh-id" }
            }))
        })))
        .mount(&server)
        .await;

    let outcome = provider.fixed_addresses().import_state(FA_REF).await;
    let state = outcome.value.unwrap();

    assert_eq!(state.extattrs, Some(AttributeMap::from([("Site", "NYC")])));
    let all = state.extattrs_all.unwrap();
    assert_eq!(all.value(INTERNAL_ID_KEY), Some("fresh-id"));
    assert!(all.get("Region").unwrap().inherited);

    let put = request_bodies(&server, "PUT").await;
    let body = put[0].as_object().unwrap();
    assert_eq!(body.keys().collect::<Vec<_>>(), vec!["extattrs"]);
    assert!(body["extattrs"].get("Region").is_none());
    assert!(body["extattrs"][INTERNAL_ID_KEY]["value"].is_string());
}

// ── Data source ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_data_source_filters_by_ext_attr() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(wapi_path("fixedaddress")))
        .and(query_param("*Site", "NYC"))
        .and(query_param("network_view", "default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [fixed_address_body(FA_REF, json!({ "Site": { "value": "NYC" } }))]
        })))
        .mount(&server)
        .await;

    let mut query = DataSourceQuery::default();
    query.filters.insert("network_view".into(), "default".into());
    query.extattrfilters.insert("Site".into(), "NYC".into());

    let outcome = provider.data_source::<FixedAddress>().read(&query).await;
    let found = outcome.value.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].extattrs.as_ref().unwrap().value("Site"), Some("NYC"));
    assert_eq!(found[0].options.known().map(Vec::len), Some(2));
}
