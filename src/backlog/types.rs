use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Advisory priority. Selection never looks at it; backlog order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// One unit of agent-executable work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Stable join key used when marking completion
    pub id: u64,
    /// Short label, also the commit message body (`feat: <title>`)
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    /// Features that should conceptually land first. Advisory only.
    #[serde(default)]
    pub dependencies: Vec<u64>,
    #[serde(default)]
    pub done: bool,
    /// Fields we don't model, kept so a save never drops hand-written data
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    pub fn new(id: u64, title: &str, description: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            priority: Priority::default(),
            dependencies: Vec::new(),
            done: false,
            extra: Map::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<u64>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// The audit-log commit message for this feature.
    pub fn commit_message(&self) -> String {
        format!("feat: {}", self.title)
    }
}

/// A context value that authors write either as one string or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    pub fn is_empty(&self) -> bool {
        match self {
            TextOrList::Text(s) => s.trim().is_empty(),
            TextOrList::List(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }
}

impl fmt::Display for TextOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOrList::Text(s) => write!(f, "{}", s),
            TextOrList::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// Shared project metadata injected verbatim into every prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development_approach: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_standards: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectContext {
    /// True when at least one rendered field carries text.
    pub fn has_content(&self) -> bool {
        let filled = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.name)
            || filled(&self.description)
            || self.tech_stack.as_ref().is_some_and(|t| !t.is_empty())
            || filled(&self.architecture)
            || filled(&self.development_approach)
            || self.code_standards.iter().any(|s| !s.trim().is_empty())
    }
}

/// Which on-disk shape a backlog was read from. Saving writes the same shape back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklogShape {
    /// `[ {feature}, ... ]`
    BareList,
    /// `{ "project_context": {...}, "features": [ ... ] }`
    WithContext,
}

/// Object form of the backlog file.
#[derive(Serialize, Deserialize)]
struct WrappedBacklog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_context: Option<ProjectContext>,
    features: Vec<Feature>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Canonical in-memory backlog, independent of the shape it was stored in.
#[derive(Debug, Clone, PartialEq)]
pub struct Backlog {
    pub shape: BacklogShape,
    pub context: Option<ProjectContext>,
    pub features: Vec<Feature>,
    /// Unknown top-level keys of the object shape
    pub extra: Map<String, Value>,
}

impl Backlog {
    pub fn bare(features: Vec<Feature>) -> Self {
        Self {
            shape: BacklogShape::BareList,
            context: None,
            features,
            extra: Map::new(),
        }
    }

    pub fn with_context(context: Option<ProjectContext>, features: Vec<Feature>) -> Self {
        Self {
            shape: BacklogShape::WithContext,
            context,
            features,
            extra: Map::new(),
        }
    }

    /// Parse either accepted shape. The error is a human-readable reason.
    pub fn from_json_str(content: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
        match value {
            Value::Array(_) => {
                let features: Vec<Feature> =
                    serde_json::from_value(value).map_err(|e| e.to_string())?;
                Ok(Self::bare(features))
            }
            Value::Object(_) => {
                let wrapped: WrappedBacklog =
                    serde_json::from_value(value).map_err(|e| e.to_string())?;
                Ok(Self {
                    shape: BacklogShape::WithContext,
                    context: wrapped.project_context,
                    features: wrapped.features,
                    extra: wrapped.extra,
                })
            }
            _ => Err("expected an array of features or an object with `features`".to_string()),
        }
    }

    /// Serialize back into the shape the backlog was loaded from.
    pub fn to_json_string_pretty(&self) -> serde_json::Result<String> {
        match self.shape {
            BacklogShape::BareList => serde_json::to_string_pretty(&self.features),
            BacklogShape::WithContext => serde_json::to_string_pretty(&WrappedBacklog {
                project_context: self.context.clone(),
                features: self.features.clone(),
                extra: self.extra.clone(),
            }),
        }
    }

    /// Context worth rendering, if any.
    pub fn context(&self) -> Option<&ProjectContext> {
        self.context.as_ref().filter(|c| c.has_content())
    }

    pub fn feature(&self, id: u64) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(|f| !f.done)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(|f| f.done)
    }

    pub fn is_complete(&self) -> bool {
        self.pending().next().is_none()
    }

    /// First pending feature in backlog order whose id is not in `passed_over`.
    ///
    /// Dependencies are not consulted: order in the file is the schedule.
    pub fn next_pending(&self, passed_over: &HashSet<u64>) -> Option<&Feature> {
        self.pending().find(|f| !passed_over.contains(&f.id))
    }

    /// Dependencies of `feature` that are not done (unknown ids count as unmet).
    pub fn unmet_dependencies(&self, feature: &Feature) -> Vec<u64> {
        feature
            .dependencies
            .iter()
            .copied()
            .filter(|dep| !self.feature(*dep).is_some_and(|f| f.done))
            .collect()
    }

    /// Flip `done` on every feature carrying `id`. Returns false if none matched.
    pub fn mark_done(&mut self, id: u64) -> bool {
        let mut found = false;
        for feature in self.features.iter_mut().filter(|f| f.id == id) {
            feature.done = true;
            found = true;
        }
        found
    }
}
