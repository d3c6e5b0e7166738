use std::collections::BTreeMap;

use serde::Deserialize;

/// YAML description of a simulated cluster.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub brokers: Vec<BrokerFixture>,
    pub topics: BTreeMap<String, Vec<PartitionFixture>>,
    pub groups: BTreeMap<String, GroupFixture>,
}

/// A broker id, optionally with the address clients bootstrap from.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BrokerFixture {
    Id(i32),
    Addressed { id: i32, address: String },
}

#[derive(Debug, Deserialize)]
pub struct PartitionFixture {
    pub leader: i32,
    #[serde(default)]
    pub replicas: Vec<i32>,
    #[serde(default)]
    pub isr: Vec<i32>,
    #[serde(default)]
    pub oldest: i64,
    #[serde(default)]
    pub newest: i64,
}

#[derive(Debug, Deserialize)]
pub struct GroupFixture {
    pub coordinator: i32,
    #[serde(default)]
    pub offsets: BTreeMap<String, BTreeMap<i32, i64>>,
}
