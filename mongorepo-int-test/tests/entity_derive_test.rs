use bson::{doc, Bson};
use mongorepo::repository::{needs_legacy_conversion, Entity};
use mongorepo_derive::Entity;
use mongorepo_int_test::fixtures::{
    Animal, ClassA, ClassB, CustomIdEntity, Customer, Dog, IntCustomer, LegacyCustomer, Lion,
};
use serde::{Deserialize, Serialize};
use std::any::TypeId;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[derive(Debug, Entity, Clone, Serialize, Deserialize)]
#[entity(collection = "Accounts", id(field = "account_no"))]
struct Account {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    account_no: Option<i64>,
    owner: String,
}

#[test]
fn test_descriptor_from_attributes() {
    let entity_type = Account::entity_type();
    assert_eq!(entity_type.name(), "Account");
    assert_eq!(entity_type.collection_name(), Some("Accounts"));
    assert_eq!(entity_type.id_field(), "account_no");
    assert_eq!(entity_type.stored_id_field(), "_id");
    assert!(!entity_type.is_legacy_object_id());
    assert!(entity_type.parent().is_none());
    assert_eq!(entity_type.type_id(), TypeId::of::<Account>());
}

#[test]
fn test_default_id_field() {
    let entity_type = Customer::entity_type();
    assert_eq!(entity_type.id_field(), "id");
    assert_eq!(entity_type.collection_name(), None);
    assert_eq!(CustomIdEntity::entity_type().id_field(), "key");
    assert_eq!(IntCustomer::entity_type().id_field(), "number");
}

#[test]
fn test_parent_chain() {
    let lion = Lion::entity_type();
    let names: Vec<_> = lion.lineage().map(|t| t.name()).collect();
    assert_eq!(names, vec!["Lion", "CatLike", "Animal"]);

    assert!(Dog::entity_type().is_a(Animal::entity_type()));
    assert!(!Animal::entity_type().is_a(Dog::entity_type()));
    assert!(ClassB::entity_type().is_a(ClassA::entity_type()));
}

#[test]
fn test_id_accessors() {
    let mut account = Account {
        account_no: None,
        owner: "Bob".to_string(),
    };
    assert_eq!(account.id(), None);
    account.set_id(42);
    assert_eq!(account.id(), Some(&42));
    assert_eq!(account.account_no, Some(42));
}

#[test]
fn test_runtime_type_defaults_to_entity_type() {
    let customer = Customer::new("Bob", 1);
    assert_eq!(customer.runtime_type(), Customer::entity_type());

    let value = ClassA::c(3);
    assert_eq!(value.runtime_type().name(), "ClassC");
}

#[test]
fn test_legacy_marker() {
    assert!(LegacyCustomer::entity_type().is_legacy_object_id());
    assert!(needs_legacy_conversion::<LegacyCustomer>());
    assert!(!needs_legacy_conversion::<Customer>());
    assert!(!needs_legacy_conversion::<IntCustomer>());
}

#[test]
fn test_absent_id_is_not_serialized() {
    let document = bson::to_document(&Customer::new("Bob", 42)).unwrap();
    assert!(!document.contains_key("_id"));
    assert_eq!(document.get_str("name").unwrap(), "Bob");
}

#[test]
fn test_legacy_id_serialized_as_object_id() {
    let customer = LegacyCustomer {
        id: Some("5f1d7a3b9c2e4a0012345678".to_string()),
        name: "Legacy".to_string(),
    };
    let document = bson::to_document(&customer).unwrap();
    assert!(matches!(document.get("_id"), Some(Bson::ObjectId(_))));

    let decoded: LegacyCustomer = bson::from_document(document).unwrap();
    assert_eq!(decoded, customer);

    let without_id: LegacyCustomer = bson::from_document(doc! { "name": "New" }).unwrap();
    assert_eq!(without_id.id, None);
}

#[test]
fn test_polymorphic_enum_document_shape() {
    let mut value = ClassA::b("tagged");
    value.set_id("b-1".to_string());
    let document = bson::to_document(&value).unwrap();
    assert_eq!(document.get_str("_t").unwrap(), "B");
    assert_eq!(document.get_str("_id").unwrap(), "b-1");
    assert_eq!(document.get_str("label").unwrap(), "tagged");
}
