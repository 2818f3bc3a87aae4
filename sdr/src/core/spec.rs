//! Declarative description of the agent tree submitted for one run.
//!
//! An [`AgentSpec`] is configuration only: it names the agent, carries its
//! rendered instructions, and lists its outgoing edges. Tool edges return a
//! value to the caller; handoff edges transfer the remainder of the run.

use serde::Serialize;

/// One agent node: instructions plus outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSpec {
    pub name: String,
    pub model: String,
    pub instructions: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolBinding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub handoffs: Vec<AgentSpec>,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, model: impl Into<String>, instructions: String) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            instructions,
            tools: Vec::new(),
            handoffs: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: ToolBinding) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_handoff(mut self, target: AgentSpec) -> Self {
        self.handoffs.push(target);
        self
    }

    /// Tool names in declaration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolBinding::name).collect()
    }

    pub fn find_tool(&self, name: &str) -> Option<&ToolBinding> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn handoff_names(&self) -> Vec<&str> {
        self.handoffs.iter().map(|spec| spec.name.as_str()).collect()
    }
}

/// A capability an agent may call without giving up control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolBinding {
    /// Another agent exposed as a callable tool.
    Agent {
        tool_name: String,
        description: String,
        agent: Box<AgentSpec>,
    },
    /// A native function implemented by this crate.
    Function {
        tool_name: String,
        description: String,
    },
}

impl ToolBinding {
    pub fn agent(tool_name: &str, description: impl Into<String>, agent: AgentSpec) -> Self {
        ToolBinding::Agent {
            tool_name: tool_name.to_string(),
            description: description.into(),
            agent: Box::new(agent),
        }
    }

    pub fn function(tool_name: &str, description: impl Into<String>) -> Self {
        ToolBinding::Function {
            tool_name: tool_name.to_string(),
            description: description.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ToolBinding::Agent { tool_name, .. } | ToolBinding::Function { tool_name, .. } => {
                tool_name
            }
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ToolBinding::Agent { description, .. } | ToolBinding::Function { description, .. } => {
                description
            }
        }
    }

    /// The wrapped agent, for agent-backed tools.
    pub fn agent_spec(&self) -> Option<&AgentSpec> {
        match self {
            ToolBinding::Agent { agent, .. } => Some(agent),
            ToolBinding::Function { .. } => None,
        }
    }
}
