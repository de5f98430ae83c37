//! Backend resolution: model identifier plus configured preference to a
//! concrete executor instance, with caching.

use crate::agent_cli::AgentCliExecutor;
use crate::api::ApiExecutor;
use crate::catalog;
use crate::client::{ChatClient, ClientFactory};
use crate::codex_cli::CodexCliExecutor;
use crate::gemini_cli::GeminiCliExecutor;
use crate::runner::{CommandRunner, ProcessRunner};
use arc_swap::ArcSwap;
use counsel_config::{Config, ProviderSettings};
use counsel_types::{BackendKind, CounselError, Executor, ProviderId, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Maps models to cached executor instances.
///
/// The cache key includes the resolved backend preference: the same model id
/// can legitimately resolve to different executors across the process
/// lifetime when configuration is reloaded, and a key without the preference
/// would silently serve the wrong backend.
pub struct BackendResolver {
    config: ArcSwap<Config>,
    runner: Arc<dyn CommandRunner>,
    clients: ClientFactory,
    executors: Mutex<HashMap<(String, BackendKind), Arc<dyn Executor>>>,
}

impl BackendResolver {
    /// Creates a resolver that spawns real subprocesses.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner::new()))
    }

    /// Creates a resolver over an explicit runner (injected in tests).
    #[must_use]
    pub fn with_runner(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            runner,
            clients: ClientFactory::new(),
            executors: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current configuration snapshot.
    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Returns the subprocess runner shared with CLI executors.
    #[must_use]
    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::clone(&self.runner)
    }

    /// Replaces the configuration and invalidates cached executors.
    pub fn reload(&self, config: Config) {
        self.config.store(Arc::new(config));
        if let Ok(mut executors) = self.executors.lock() {
            executors.clear();
        }
    }

    /// Resolves a model identifier to its executor.
    ///
    /// # Errors
    ///
    /// Returns [`CounselError::UnknownModel`] when no provider family matches,
    /// [`CounselError::Config`] when the configured preference cannot serve
    /// the family (including `web`, which has no executor), and
    /// [`CounselError::MissingApiKey`] when the `api` preference lacks a
    /// credential.
    pub fn resolve(&self, model: &str) -> Result<Arc<dyn Executor>> {
        let family = catalog::resolve_family(model)
            .ok_or_else(|| CounselError::UnknownModel(model.to_string()))?;
        let config = self.config.load_full();
        let settings = config.provider(family);
        let kind = settings.backend;

        if let Ok(executors) = self.executors.lock()
            && let Some(executor) = executors.get(&(model.to_string(), kind))
        {
            return Ok(Arc::clone(executor));
        }

        let executor = self.build(family, kind, &settings, &config, model)?;
        if let Ok(mut executors) = self.executors.lock() {
            executors.insert((model.to_string(), kind), Arc::clone(&executor));
        }
        Ok(executor)
    }

    /// Constructs the executor variant for one (family, preference) pair.
    fn build(
        &self,
        family: ProviderId,
        kind: BackendKind,
        settings: &ProviderSettings,
        config: &Config,
        model: &str,
    ) -> Result<Arc<dyn Executor>> {
        match kind {
            BackendKind::Api => {
                let client = self.clients.get(family, config)?;
                Ok(Arc::new(ApiExecutor::new(client as Arc<dyn ChatClient>)))
            }
            BackendKind::GeminiCli => {
                if family != ProviderId::Google {
                    return Err(CounselError::Config(format!(
                        "backend gemini-cli cannot serve {family} models ({model})"
                    )));
                }
                Ok(Arc::new(self.gemini_executor(settings)))
            }
            BackendKind::CodexCli => {
                if family != ProviderId::OpenAi {
                    return Err(CounselError::Config(format!(
                        "backend codex-cli cannot serve {family} models ({model})"
                    )));
                }
                Ok(Arc::new(self.codex_executor(settings)))
            }
            BackendKind::AgentCli => Ok(Arc::new(self.agent_executor(settings))),
            BackendKind::Web => Err(CounselError::Config(format!(
                "backend web has no executor for {model}; hand the prompt off manually"
            ))),
        }
    }

    fn gemini_executor(&self, settings: &ProviderSettings) -> GeminiCliExecutor {
        match &settings.command {
            Some(command) => GeminiCliExecutor::with_program(self.runner(), command),
            None => GeminiCliExecutor::new(self.runner()),
        }
    }

    fn codex_executor(&self, settings: &ProviderSettings) -> CodexCliExecutor {
        let executor = match &settings.command {
            Some(command) => CodexCliExecutor::with_program(self.runner(), command),
            None => CodexCliExecutor::new(self.runner()),
        };
        executor.with_reasoning_effort(settings.reasoning_effort)
    }

    fn agent_executor(&self, settings: &ProviderSettings) -> AgentCliExecutor {
        let executor = match &settings.command {
            Some(command) => AgentCliExecutor::with_program(self.runner(), command),
            None => AgentCliExecutor::new(self.runner()),
        };
        executor.with_reasoning_effort(settings.reasoning_effort)
    }
}
