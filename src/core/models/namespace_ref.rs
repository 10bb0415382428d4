use std::fmt;

/// Source format of a namespace, decided by its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceFormat {
    Properties,
    Yaml,
    Json,
    Xml,
    /// Any other suffix (`txt`, ...): compared as opaque text.
    Text,
}

impl NamespaceFormat {
    /// Classify a namespace name by the substring after its last `.`.
    pub fn from_namespace_name(name: &str) -> Self {
        let suffix = name.rsplit_once('.').map(|(_, s)| s).unwrap_or("");
        match suffix {
            "" => NamespaceFormat::Properties,
            "yml" => NamespaceFormat::Yaml,
            "json" => NamespaceFormat::Json,
            "xml" => NamespaceFormat::Xml,
            _ => NamespaceFormat::Text,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NamespaceFormat::Properties => "properties",
            NamespaceFormat::Yaml => "yaml",
            NamespaceFormat::Json => "json",
            NamespaceFormat::Xml => "xml",
            NamespaceFormat::Text => "text",
        }
    }
}

impl fmt::Display for NamespaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies one namespace instance: app + env + cluster + namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceRef {
    pub app_id: String,
    pub env: String,
    pub cluster_name: String,
    pub namespace_name: String,
}

impl NamespaceRef {
    pub fn new(
        app_id: impl Into<String>,
        env: impl Into<String>,
        cluster_name: impl Into<String>,
        namespace_name: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            env: env.into(),
            cluster_name: cluster_name.into(),
            namespace_name: namespace_name.into(),
        }
    }

    pub fn format(&self) -> NamespaceFormat {
        NamespaceFormat::from_namespace_name(&self.namespace_name)
    }

    /// Column identity in the diff table: `env:cluster:namespace`.
    pub fn slot_id(&self) -> String {
        format!("{}:{}:{}", self.env, self.cluster_name, self.namespace_name)
    }
}

impl fmt::Display for NamespaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_id, self.slot_id())
    }
}
