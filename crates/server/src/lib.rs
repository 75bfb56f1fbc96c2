pub mod error;
pub mod extract;
pub mod routes;

pub type DeploymentImpl = deployment::Deployment;
