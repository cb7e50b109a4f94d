mod client;
mod gvk;
mod kube_client;

pub use client::*;
pub use gvk::*;
pub use kube_client::KubeResourceClient;

#[cfg(test)]
mod tests;
