use mongorepo::errors::ErrorKind;
use mongorepo::filter::field;
use mongorepo::repository::{ObjectRepository, Repository};
use mongorepo::{RepositoryBackend, RepositoryBuilder, RepositoryConfig};
use mongorepo_int_test::fixtures::{Animal, Customer, Dog};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_default_builder_opens_in_memory_repository() {
    let mut repo: ObjectRepository<Customer> = RepositoryBuilder::new().open().unwrap();
    assert!(repo.is_in_memory());
    assert_eq!(repo.collection_name(), "Customer");

    repo.add(Customer::new("Bob", 42)).unwrap();
    assert!(repo.exists(field("name").eq("Bob")).unwrap());
}

#[test]
fn test_collection_name_override() {
    let repo: ObjectRepository<Dog> = RepositoryBuilder::new()
        .collection_name("Kennel")
        .open()
        .unwrap();
    assert_eq!(repo.collection_name(), "Kennel");
}

#[test]
fn test_one_config_opens_many_types() {
    let config = RepositoryBuilder::new().in_memory().build().unwrap();
    let animals = config.open::<Animal>().unwrap();
    let dogs = config.open::<Dog>().unwrap();
    assert_eq!(animals.collection_name(), dogs.collection_name());
}

#[test]
fn test_invalid_connection_string_is_reported_at_open() {
    let result = RepositoryBuilder::new()
        .mongodb("redis://localhost:6379")
        .collection_name("Customers")
        .open::<Customer>();
    let err = result.err().expect("open fails");
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
}

#[test]
fn test_empty_collection_name_is_rejected() {
    let err = RepositoryBuilder::new()
        .collection_name("")
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
}

#[test]
fn test_connection_string_without_database_is_rejected() {
    let config = RepositoryConfig::mongodb("mongodb://localhost:27017").unwrap();
    assert_eq!(
        config.backend(),
        &RepositoryBackend::MongoDb {
            connection_string: Some("mongodb://localhost:27017".to_string())
        }
    );
    let err = config.open::<Customer>().err().expect("open fails");
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
}
