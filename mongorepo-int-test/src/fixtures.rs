use fake::faker::internet::en::FreeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use mongorepo::repository::{Entity, EntityType};
use mongorepo_derive::Entity;
use rand::random_range;
use serde::{Deserialize, Serialize};
use std::any::TypeId;

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub age: i32,
    pub email: Option<String>,
}

impl Customer {
    pub fn new(name: &str, age: i32) -> Self {
        Customer {
            id: None,
            name: name.to_string(),
            age,
            email: None,
        }
    }
}

pub fn generate_customer() -> Customer {
    Customer {
        id: None,
        name: Name().fake(),
        age: random_range(18..90),
        email: Some(FreeEmail().fake()),
    }
}

pub fn generate_customers(count: usize) -> Vec<Customer> {
    (0..count).map(|_| generate_customer()).collect()
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(collection = "MyTestCollection", id(field = "key"))]
pub struct CustomIdEntity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub data: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(id(field = "number"))]
pub struct IntCustomer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    pub name: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(id(object_id))]
pub struct LegacyCustomer {
    #[serde(
        rename = "_id",
        with = "mongorepo::repository::legacy_object_id",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    pub tags: Vec<String>,
}

impl Product {
    pub fn new(name: &str, price: f64, tags: &[&str]) -> Self {
        Product {
            id: None,
            name: name.to_string(),
            price,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub player: String,
    pub scores: Vec<i32>,
}

impl Scorecard {
    pub fn new(player: &str, scores: &[i32]) -> Self {
        Scorecard {
            id: None,
            player: player.to_string(),
            scores: scores.to_vec(),
        }
    }
}

// Animal hierarchy: Dog shares "AnimalsTest", CatLike and Lion live in "Catlikes"

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(collection = "AnimalsTest")]
pub struct Animal {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(parent = Animal)]
pub struct Dog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub breed: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(parent = Animal, collection = "Catlikes")]
pub struct CatLike {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(parent = CatLike)]
pub struct Lion {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub pride: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(parent = Bird)]
pub struct Macaw {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub colour: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(parent = ClassA)]
pub struct ClassB {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub label: String,
}

#[derive(Debug, Entity, Clone, PartialEq, Serialize, Deserialize)]
#[entity(parent = ClassA)]
pub struct ClassC {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub weight: i32,
}

/// Base type whose values are either a [`ClassB`] or a [`ClassC`], stored together in
/// the `ClassA` collection with a `_t` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_t")]
pub enum ClassA {
    B(ClassB),
    C(ClassC),
}

impl ClassA {
    pub fn b(label: &str) -> Self {
        ClassA::B(ClassB {
            id: None,
            label: label.to_string(),
        })
    }

    pub fn c(weight: i32) -> Self {
        ClassA::C(ClassC { id: None, weight })
    }
}

impl Entity for ClassA {
    type Id = String;

    fn entity_type() -> &'static EntityType {
        static ENTITY_TYPE: EntityType = EntityType::new("ClassA", TypeId::of::<ClassA>);
        &ENTITY_TYPE
    }

    fn id(&self) -> Option<&String> {
        match self {
            ClassA::B(b) => b.id.as_ref(),
            ClassA::C(c) => c.id.as_ref(),
        }
    }

    fn set_id(&mut self, id: String) {
        match self {
            ClassA::B(b) => b.id = Some(id),
            ClassA::C(c) => c.id = Some(id),
        }
    }

    fn runtime_type(&self) -> &'static EntityType {
        match self {
            ClassA::B(_) => ClassB::entity_type(),
            ClassA::C(_) => ClassC::entity_type(),
        }
    }
}
