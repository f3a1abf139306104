use std::fmt;

use serde::Serialize;

use railqa_gateway::Probe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// No probe has completed yet.
    #[default]
    Checking,
    Online,
    Offline,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Checking => write!(f, "checking"),
            ServiceStatus::Online => write!(f, "online"),
            ServiceStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Last known status of each backend dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HealthState {
    pub backend: ServiceStatus,
    pub inference_runtime: ServiceStatus,
    pub vector_store: ServiceStatus,
}

impl HealthState {
    pub fn get(&self, probe: Probe) -> ServiceStatus {
        match probe {
            Probe::Backend => self.backend,
            Probe::InferenceRuntime => self.inference_runtime,
            Probe::VectorStore => self.vector_store,
        }
    }

    pub fn set(&mut self, probe: Probe, status: ServiceStatus) {
        match probe {
            Probe::Backend => self.backend = status,
            Probe::InferenceRuntime => self.inference_runtime = status,
            Probe::VectorStore => self.vector_store = status,
        }
    }

    /// True once every dependency has reported at least once.
    pub fn is_settled(&self) -> bool {
        Probe::ALL
            .iter()
            .all(|p| self.get(*p) != ServiceStatus::Checking)
    }

    pub fn all_online(&self) -> bool {
        Probe::ALL
            .iter()
            .all(|p| self.get(*p) == ServiceStatus::Online)
    }
}
