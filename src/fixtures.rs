#[cfg(test)]
pub mod test {
    use crate::builder::{HierarchyConfig, HierarchyConfigBuilder};
    use crate::node::Node;
    use crate::types::GLOBAL;

    /// A small storage cluster: one group, one replicaset, two instances.
    pub const CLUSTER_TOML: &str = r#"
[snapshot]
dir = "/var/lib/snapshots"
count = 2

[credentials.users.admin]
password = "secret"
roles = ["super"]

[log]
level = "info"

[groups.storages]
roles = ["storage"]

[groups.storages.replicasets.s-001]
leader = "s-001-a"

[groups.storages.replicasets.s-001.instances.s-001-a]
foo = "bar"
roles = ["metrics"]

[groups.storages.replicasets.s-001.instances.s-001-a.log]
level = "debug"

[groups.storages.replicasets.s-001.instances.s-001-b]
foo = "baz"
"#;

    pub fn cluster_tree() -> Node {
        let table: toml::Table = CLUSTER_TOML.parse().unwrap();
        Node::from_table(table, "fixture")
    }

    pub fn cluster_levels() -> Vec<String> {
        [GLOBAL, "groups", "replicasets", "instances"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn cluster_config() -> HierarchyConfigBuilder {
        HierarchyConfig::builder().levels(cluster_levels())
    }

    pub fn tree(toml_str: &str) -> Node {
        Node::from_table(toml_str.parse::<toml::Table>().unwrap(), "test")
    }

    #[test]
    fn cluster_fixture_parses() {
        let root = cluster_tree();
        assert!(root.child("groups").is_some());
        assert!(cluster_config().build().is_ok());
    }
}
