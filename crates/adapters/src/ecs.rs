// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ECS-backed [`ControlPlaneAdapter`], plus conversions between ECS SDK
//! shapes and the core task model.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecs::client::Waiters;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::operation::register_task_definition::builders::RegisterTaskDefinitionFluentBuilder;
use aws_sdk_ecs::types::{
    Compatibility, ContainerDefinition, DeploymentConfiguration, Failure, HostVolumeProperties,
    KeyValuePair, LogConfiguration as SdkLogConfiguration, LogDriver, NetworkMode,
    PortMapping as SdkPortMapping, Secret as SdkSecret, Service, SortOrder, Task, TaskDefinition,
    TaskDefinitionPlacementConstraint, TaskDefinitionPlacementConstraintType,
    TaskDefinitionStatus, TransportProtocol, Volume as SdkVolume,
};
use aws_sdk_ecs::Client;
use parking_lot::Mutex;
use roll_core::{
    ContainerEntry, ContainerSettings, DeploymentSettings, EnvVar, LogConfiguration,
    PlacementConstraint, PortMapping, RunFailure, RunTaskResult, Secret, ServiceState,
    StoppedContainer, TaskSpecification, TaskStatus, Volume,
};

use crate::control_plane::{ControlPlaneAdapter, ControlPlaneError};

/// Service status ECS reports for deleted services.
const SERVICE_INACTIVE: &str = "INACTIVE";

/// ECS control plane in one region.
///
/// Fetched task definitions are kept in their SDK shape by `family:revision`.
/// Registering a specification derived from one of them starts from that raw
/// definition, so fields the core model does not carry (mount points, health
/// checks, docker labels, EFS volumes and the like) survive the new revision.
#[derive(Debug, Clone)]
pub struct EcsControlPlane {
    client: Client,
    fetched: Arc<Mutex<HashMap<String, TaskDefinition>>>,
}

impl EcsControlPlane {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: Client::new(config), fetched: Arc::default() }
    }

    fn remember(&self, task: &TaskDefinition) -> TaskSpecification {
        let spec = task_spec_from_sdk(task);
        self.fetched.lock().insert(spec.label(), task.clone());
        spec
    }

    fn base_for(&self, spec: &TaskSpecification) -> Option<TaskDefinition> {
        self.fetched.lock().get(&spec.label()).cloned()
    }
}

fn api_error(operation: &str, err: impl std::error::Error) -> ControlPlaneError {
    ControlPlaneError::Api(format!("{}: {}", operation, DisplayErrorContext(err)))
}

fn rejected(operation: &str, err: impl std::error::Error) -> ControlPlaneError {
    ControlPlaneError::Rejected(format!("{}: {}", operation, DisplayErrorContext(err)))
}

#[async_trait]
impl ControlPlaneAdapter for EcsControlPlane {
    async fn fetch_task_definition(
        &self,
        name: &str,
    ) -> Result<TaskSpecification, ControlPlaneError> {
        let output =
            self.client.describe_task_definition().task_definition(name).send().await.map_err(
                |e| {
                    let e = e.into_service_error();
                    if e.is_client_exception() {
                        ControlPlaneError::task_definition_not_found(name)
                    } else {
                        api_error("DescribeTaskDefinition", e)
                    }
                },
            )?;
        let task = output
            .task_definition()
            .ok_or_else(|| ControlPlaneError::task_definition_not_found(name))?;
        Ok(self.remember(task))
    }

    async fn fetch_latest_task_definition(
        &self,
        family: &str,
    ) -> Result<TaskSpecification, ControlPlaneError> {
        let output = self
            .client
            .list_task_definitions()
            .family_prefix(family)
            .status(TaskDefinitionStatus::Active)
            .sort(SortOrder::Desc)
            .max_results(1)
            .send()
            .await
            .map_err(|e| api_error("ListTaskDefinitions", e))?;
        let latest = output
            .task_definition_arns()
            .first()
            .ok_or_else(|| ControlPlaneError::task_definition_not_found(family))?;
        tracing::debug!(family, arn = %latest, "latest task definition");
        self.fetch_task_definition(latest).await
    }

    async fn fetch_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<ServiceState, ControlPlaneError> {
        let output = self
            .client
            .describe_services()
            .cluster(cluster)
            .services(service)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_cluster_not_found_exception() {
                    ControlPlaneError::NotFound { kind: "cluster", name: cluster.to_string() }
                } else {
                    api_error("DescribeServices", e)
                }
            })?;
        for failure in output.failures() {
            tracing::debug!(
                cluster,
                service,
                reason = ?failure.reason(),
                "describe services failure"
            );
        }
        output
            .services()
            .iter()
            .find(|s| s.status() != Some(SERVICE_INACTIVE))
            .map(service_from_sdk)
            .ok_or_else(|| ControlPlaneError::service_not_found(cluster, service))
    }

    async fn register_task_definition(
        &self,
        spec: &TaskSpecification,
    ) -> Result<TaskSpecification, ControlPlaneError> {
        let base = self.base_for(spec);
        if base.is_none() {
            tracing::debug!(
                task_definition = %spec.label(),
                "no fetched definition, registering modeled fields only"
            );
        }
        let containers = containers_for_registration(spec, base.as_ref())?;
        let volumes = volumes_for_registration(spec, base.as_ref());
        let compatibilities = spec
            .requires_compatibilities
            .iter()
            .map(|c| Compatibility::from(c.as_str()))
            .collect::<Vec<_>>();
        let request = self
            .client
            .register_task_definition()
            .family(&spec.family)
            .set_container_definitions(Some(containers))
            .set_network_mode(spec.network_mode.as_deref().map(NetworkMode::from))
            .set_placement_constraints(non_empty(
                spec.placement_constraints.iter().map(placement_to_sdk).collect(),
            ))
            .set_task_role_arn(spec.task_role_arn.clone())
            .set_execution_role_arn(spec.execution_role_arn.clone())
            .set_volumes(non_empty(volumes))
            .set_requires_compatibilities(non_empty(compatibilities))
            .set_cpu(spec.cpu.clone())
            .set_memory(spec.memory.clone());
        let output = carry_task_fields(request, base.as_ref())
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_client_exception() || e.is_invalid_parameter_exception() {
                    rejected("RegisterTaskDefinition", e)
                } else {
                    api_error("RegisterTaskDefinition", e)
                }
            })?;
        let registered = output.task_definition().ok_or_else(|| {
            ControlPlaneError::Api(
                "RegisterTaskDefinition: response carried no task definition".into(),
            )
        })?;
        Ok(self.remember(registered))
    }

    async fn update_service(
        &self,
        service: &ServiceState,
        spec: &TaskSpecification,
    ) -> Result<ServiceState, ControlPlaneError> {
        let deployment = DeploymentConfiguration::builder()
            .set_minimum_healthy_percent(service.deployment.minimum_healthy_percent)
            .set_maximum_percent(service.deployment.maximum_percent)
            .build();
        let output = self
            .client
            .update_service()
            .cluster(&service.cluster_arn)
            .service(&service.name)
            .task_definition(spec.reference())
            .desired_count(service.desired_count)
            .deployment_configuration(deployment)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_service_not_found_exception() || e.is_service_not_active_exception() {
                    ControlPlaneError::service_not_found(&service.cluster_arn, &service.name)
                } else if e.is_client_exception() || e.is_invalid_parameter_exception() {
                    rejected("UpdateService", e)
                } else {
                    api_error("UpdateService", e)
                }
            })?;
        let updated = output.service().ok_or_else(|| {
            ControlPlaneError::Api("UpdateService: response carried no service".into())
        })?;
        Ok(service_from_sdk(updated))
    }

    async fn wait_service_stable(
        &self,
        cluster: &str,
        service: &str,
        max_wait: Duration,
    ) -> Result<(), ControlPlaneError> {
        self.client
            .wait_until_services_stable()
            .cluster(cluster)
            .services(service)
            .wait(max_wait)
            .await
            .map_err(|e| {
                ControlPlaneError::Wait(format!(
                    "service {}/{} not stable within {}s: {}",
                    cluster,
                    service,
                    max_wait.as_secs(),
                    DisplayErrorContext(e)
                ))
            })?;
        Ok(())
    }

    async fn run_task(
        &self,
        cluster: &str,
        spec: &TaskSpecification,
    ) -> Result<RunTaskResult, ControlPlaneError> {
        let output = self
            .client
            .run_task()
            .cluster(cluster)
            .task_definition(spec.reference())
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_cluster_not_found_exception() {
                    ControlPlaneError::NotFound { kind: "cluster", name: cluster.to_string() }
                } else if e.is_client_exception() || e.is_invalid_parameter_exception() {
                    rejected("RunTask", e)
                } else {
                    api_error("RunTask", e)
                }
            })?;
        Ok(run_result_from_sdk(output.tasks(), output.failures()))
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        task_arns: &[String],
    ) -> Result<Vec<TaskStatus>, ControlPlaneError> {
        let output = self
            .client
            .describe_tasks()
            .cluster(cluster)
            .set_tasks(Some(task_arns.to_vec()))
            .send()
            .await
            .map_err(|e| api_error("DescribeTasks", e))?;
        if let Some(failure) = output.failures().first() {
            return Err(ControlPlaneError::Api(format!(
                "DescribeTasks: {}",
                run_failure_from_sdk(failure)
            )));
        }
        Ok(output.tasks().iter().map(task_status_from_sdk).collect())
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn non_zero(value: i32) -> Option<i32> {
    (value != 0).then_some(value)
}

// ── SDK → core ──────────────────────────────────────────────────────────

pub(crate) fn task_spec_from_sdk(task: &TaskDefinition) -> TaskSpecification {
    TaskSpecification {
        family: task.family().unwrap_or_default().to_string(),
        revision: task.revision(),
        arn: task.task_definition_arn().map(str::to_string),
        containers: task.container_definitions().iter().map(container_from_sdk).collect(),
        network_mode: task.network_mode().map(|m| m.as_str().to_string()),
        placement_constraints: task
            .placement_constraints()
            .iter()
            .map(|p| PlacementConstraint {
                kind: p.r#type().map(|t| t.as_str().to_string()).unwrap_or_default(),
                expression: p.expression().map(str::to_string),
            })
            .collect(),
        task_role_arn: task.task_role_arn().map(str::to_string),
        execution_role_arn: task.execution_role_arn().map(str::to_string),
        volumes: task
            .volumes()
            .iter()
            .map(|v| Volume {
                name: v.name().unwrap_or_default().to_string(),
                host_source_path: v.host().and_then(|h| h.source_path()).map(str::to_string),
            })
            .collect(),
        requires_compatibilities: task
            .requires_compatibilities()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect(),
        cpu: task.cpu().map(str::to_string),
        memory: task.memory().map(str::to_string),
    }
}

fn container_from_sdk(def: &ContainerDefinition) -> ContainerEntry {
    let settings = ContainerSettings {
        cpu: non_zero(def.cpu()),
        memory: def.memory(),
        memory_reservation: def.memory_reservation(),
        essential: def.essential(),
        entry_point: def.entry_point().to_vec(),
        command: def.command().to_vec(),
        environment: def
            .environment()
            .iter()
            .map(|kv| EnvVar {
                name: kv.name().unwrap_or_default().to_string(),
                value: kv.value().unwrap_or_default().to_string(),
            })
            .collect(),
        secrets: def
            .secrets()
            .iter()
            .map(|s| Secret { name: s.name().to_string(), value_from: s.value_from().to_string() })
            .collect(),
        port_mappings: def
            .port_mappings()
            .iter()
            .filter_map(|p| {
                Some(PortMapping {
                    container_port: p.container_port()?,
                    host_port: p.host_port(),
                    protocol: p.protocol().map(|t| t.as_str().to_string()),
                })
            })
            .collect(),
        working_directory: def.working_directory().map(str::to_string),
        log_configuration: def.log_configuration().map(|l| LogConfiguration {
            log_driver: l.log_driver().as_str().to_string(),
            options: l
                .options()
                .map(|o| o.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<BTreeMap<_, _>>())
                .unwrap_or_default(),
        }),
    };
    ContainerEntry {
        name: def.name().unwrap_or_default().to_string(),
        image: def.image().unwrap_or_default().to_string(),
        settings,
    }
}

fn service_from_sdk(service: &Service) -> ServiceState {
    let deployment = service
        .deployment_configuration()
        .map(|d| DeploymentSettings {
            minimum_healthy_percent: d.minimum_healthy_percent(),
            maximum_percent: d.maximum_percent(),
        })
        .unwrap_or_default();
    ServiceState {
        name: service.service_name().unwrap_or_default().to_string(),
        cluster_arn: service.cluster_arn().unwrap_or_default().to_string(),
        task_definition: service.task_definition().unwrap_or_default().to_string(),
        desired_count: service.desired_count(),
        deployment,
    }
}

fn run_failure_from_sdk(failure: &Failure) -> RunFailure {
    let reason = match (failure.reason(), failure.detail()) {
        (Some(reason), Some(detail)) => format!("{}: {}", reason, detail),
        (Some(reason), None) => reason.to_string(),
        (None, Some(detail)) => detail.to_string(),
        (None, None) => "unknown failure".to_string(),
    };
    RunFailure { arn: failure.arn().map(str::to_string), reason }
}

pub(crate) fn run_result_from_sdk(tasks: &[Task], failures: &[Failure]) -> RunTaskResult {
    RunTaskResult {
        task_arns: tasks.iter().filter_map(|t| t.task_arn()).map(str::to_string).collect(),
        failures: failures.iter().map(run_failure_from_sdk).collect(),
    }
}

pub(crate) fn task_status_from_sdk(task: &Task) -> TaskStatus {
    TaskStatus {
        task_arn: task.task_arn().unwrap_or_default().to_string(),
        last_status: task.last_status().unwrap_or_default().to_string(),
        stopped_reason: task.stopped_reason().map(str::to_string),
        stop_code: task.stop_code().map(|code| code.as_str().to_string()),
        containers: task
            .containers()
            .iter()
            .map(|c| StoppedContainer {
                name: c.name().unwrap_or_default().to_string(),
                exit_code: c.exit_code(),
            })
            .collect(),
    }
}

// ── core → SDK ──────────────────────────────────────────────────────────

/// Container definitions for a new revision of `spec`.
///
/// A container present in `base` is resubmitted as fetched with only its
/// image replaced. Anything else is built from the modeled settings.
pub(crate) fn containers_for_registration(
    spec: &TaskSpecification,
    base: Option<&TaskDefinition>,
) -> Result<Vec<ContainerDefinition>, ControlPlaneError> {
    spec.containers
        .iter()
        .map(|entry| {
            let fetched = base.and_then(|b| {
                b.container_definitions().iter().find(|d| d.name() == Some(entry.name.as_str()))
            });
            match fetched {
                Some(fetched) => {
                    let mut def = fetched.clone();
                    def.image = Some(entry.image.clone());
                    Ok(def)
                }
                None => container_to_sdk(entry),
            }
        })
        .collect()
}

/// Volumes for a new revision of `spec`, preferring the fetched shape by name.
pub(crate) fn volumes_for_registration(
    spec: &TaskSpecification,
    base: Option<&TaskDefinition>,
) -> Vec<SdkVolume> {
    spec.volumes
        .iter()
        .map(|volume| {
            base.and_then(|b| b.volumes().iter().find(|v| v.name() == Some(volume.name.as_str())))
                .cloned()
                .unwrap_or_else(|| volume_to_sdk(volume))
        })
        .collect()
}

/// Task-level fields outside the core model, copied from the fetched definition.
fn carry_task_fields(
    request: RegisterTaskDefinitionFluentBuilder,
    base: Option<&TaskDefinition>,
) -> RegisterTaskDefinitionFluentBuilder {
    let Some(base) = base else {
        return request;
    };
    request
        .set_pid_mode(base.pid_mode().cloned())
        .set_ipc_mode(base.ipc_mode().cloned())
        .set_proxy_configuration(base.proxy_configuration().cloned())
        .set_inference_accelerators(non_empty(base.inference_accelerators().to_vec()))
        .set_ephemeral_storage(base.ephemeral_storage().cloned())
        .set_runtime_platform(base.runtime_platform().cloned())
}

pub(crate) fn container_to_sdk(
    entry: &ContainerEntry,
) -> Result<ContainerDefinition, ControlPlaneError> {
    let s = &entry.settings;
    let secrets = s
        .secrets
        .iter()
        .map(|secret| {
            SdkSecret::builder()
                .name(&secret.name)
                .value_from(&secret.value_from)
                .build()
                .map_err(|e| rejected("secret", e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let log_configuration = s
        .log_configuration
        .as_ref()
        .map(|l| {
            SdkLogConfiguration::builder()
                .log_driver(LogDriver::from(l.log_driver.as_str()))
                .set_options(if l.options.is_empty() {
                    None
                } else {
                    Some(l.options.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                })
                .build()
                .map_err(|e| rejected("logConfiguration", e))
        })
        .transpose()?;

    Ok(ContainerDefinition::builder()
        .name(&entry.name)
        .image(&entry.image)
        .set_cpu(s.cpu)
        .set_memory(s.memory)
        .set_memory_reservation(s.memory_reservation)
        .set_essential(s.essential)
        .set_entry_point(non_empty(s.entry_point.clone()))
        .set_command(non_empty(s.command.clone()))
        .set_environment(non_empty(
            s.environment
                .iter()
                .map(|e| KeyValuePair::builder().name(&e.name).value(&e.value).build())
                .collect(),
        ))
        .set_secrets(non_empty(secrets))
        .set_port_mappings(non_empty(
            s.port_mappings
                .iter()
                .map(|p| {
                    SdkPortMapping::builder()
                        .container_port(p.container_port)
                        .set_host_port(p.host_port)
                        .set_protocol(p.protocol.as_deref().map(TransportProtocol::from))
                        .build()
                })
                .collect(),
        ))
        .set_working_directory(s.working_directory.clone())
        .set_log_configuration(log_configuration)
        .build())
}

fn placement_to_sdk(constraint: &PlacementConstraint) -> TaskDefinitionPlacementConstraint {
    TaskDefinitionPlacementConstraint::builder()
        .r#type(TaskDefinitionPlacementConstraintType::from(constraint.kind.as_str()))
        .set_expression(constraint.expression.clone())
        .build()
}

fn volume_to_sdk(volume: &Volume) -> SdkVolume {
    SdkVolume::builder()
        .name(&volume.name)
        .set_host(
            volume
                .host_source_path
                .as_ref()
                .map(|p| HostVolumeProperties::builder().source_path(p).build()),
        )
        .build()
}

#[cfg(test)]
#[path = "ecs_tests.rs"]
mod tests;
