//! The phase sequencer.
//!
//! ```text
//! FetchingConfig -> LoadingFonts -> LoadingStyles -> LoadingBlocks
//!                -> LoadingScripts -> Initializing -> Ready
//!        \______________\________________\_____________\______ Failed
//! ```
//!
//! Each phase starts after the previous one fully resolved. Only the configuration
//! fetch and the stylesheets can end a run early.

use crate::assets::{
    BlockOutcome, ScriptOutcome, load_blocks, load_fonts, load_scripts, load_styles,
};
use crate::document::Document;
use crate::error::{LoaderError, LoaderErrorExt};
use crate::hooks::HookRegistry;
use crate::initialize::{Initialization, initialize};
use crate::progress::{LoaderStatus, PhaseEvent, Reporter};
use crate::terminal::{TerminalController, TerminalState};
use parking_lot::Mutex;
use serde::Serialize;
use stager_domain::config::LoaderSettings;
use stager_domain::manifest::LoaderConfig;
use stager_domain::phase::Phase;
use stager_domain::progress::LoadProgress;
use stager_fetch::{HttpTransport, RetryPolicy, RetryingFetcher, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::{Instrument, info, info_span, warn};

/// Everything one run did, in the order it happened.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// 1 for the first run of a pipeline, incremented by every reload.
    pub run: usize,
    /// Every phase entered, ending with the terminal one.
    pub transitions: Vec<Phase>,
    pub terminal: TerminalState,
    pub fonts: usize,
    pub styles: usize,
    pub blocks: Vec<BlockOutcome>,
    pub scripts: Vec<ScriptOutcome>,
    pub initialization: Initialization,
    pub loaded_blocks: usize,
    pub total_blocks: usize,
    /// `None` when the run never reached the blocks phase.
    pub percent: Option<u8>,
}

impl PipelineReport {
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.terminal.phase()
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.terminal, TerminalState::Ready { .. })
    }

    /// Message shown on the failure panel, if the run failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.terminal {
            TerminalState::Failed { detail } => Some(detail),
            TerminalState::Ready { .. } => None,
        }
    }

    #[must_use]
    pub const fn elapsed(&self) -> Option<Duration> {
        match self.terminal {
            TerminalState::Ready { elapsed } => Some(elapsed),
            TerminalState::Failed { .. } => None,
        }
    }

    /// Blocks that were not injected: undefined, without a container, or failed.
    pub fn block_issues(&self) -> impl Iterator<Item = &BlockOutcome> {
        self.blocks.iter().filter(|outcome| !matches!(outcome, BlockOutcome::Injected { .. }))
    }

    pub fn failed_scripts(&self) -> impl Iterator<Item = &ScriptOutcome> {
        self.scripts.iter().filter(|outcome| matches!(outcome, ScriptOutcome::Failed { .. }))
    }
}

/// Work recorded by the phases of a run, whether or not it got to the end.
#[derive(Debug, Default)]
struct Stages {
    transitions: Vec<Phase>,
    fonts: usize,
    styles: usize,
    blocks: Vec<BlockOutcome>,
    scripts: Vec<ScriptOutcome>,
    initialization: Initialization,
}

#[derive(Debug, Default)]
pub struct PipelineBuilder {
    document: Option<Arc<dyn Document>>,
    transport: Option<Arc<dyn Transport>>,
    settings: LoaderSettings,
    hooks: HookRegistry,
}

impl PipelineBuilder {
    #[must_use]
    pub fn document(mut self, document: Arc<dyn Document>) -> Self {
        self.document = Some(document);
        self
    }

    /// Transport for the configuration and block fetches. Defaults to [`HttpTransport`].
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: LoaderSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn config_url(mut self, url: impl Into<String>) -> Self {
        self.settings.config_url = url.into();
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// # Errors
    /// * [`LoaderError::InvalidSettings`] when the settings fail validation.
    /// * [`LoaderError::Internal`] without a document.
    /// * [`LoaderError::Fetch`] when the default HTTP transport cannot be built.
    pub fn build(self) -> Result<Pipeline, LoaderError> {
        self.settings.validate().map_err(|message| LoaderError::InvalidSettings {
            message: message.into(),
            context: Some("Building pipeline".into()),
        })?;
        let document = self.document.ok_or("a document is required to build a pipeline")?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new().context("Building HTTP transport")?),
        };

        let fetch = &self.settings.fetch;
        let policy = RetryPolicy::default()
            .with_max_attempts(fetch.max_attempts)
            .with_timeout(fetch.timeout())
            .with_backoff_step(fetch.backoff_step());

        Ok(Pipeline {
            reporter: Reporter::new(Arc::clone(&document)),
            document,
            fetcher: RetryingFetcher::new(transport, policy),
            settings: self.settings,
            hooks: self.hooks,
            runs: 0,
        })
    }
}

/// Loads a site into a [`Document`], phase by phase.
///
/// Runs take `&mut self`, so two runs of one pipeline never overlap.
#[derive(Debug)]
pub struct Pipeline {
    document: Arc<dyn Document>,
    fetcher: RetryingFetcher,
    settings: LoaderSettings,
    hooks: HookRegistry,
    reporter: Reporter,
    runs: usize,
}

impl Pipeline {
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    #[must_use]
    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    #[must_use]
    pub const fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    #[must_use]
    pub fn watch(&self) -> watch::Receiver<LoaderStatus> {
        self.reporter.watch()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PhaseEvent>> {
        self.reporter.subscribe()
    }

    /// Runs every phase and settles the document in its terminal state.
    ///
    /// Every run after the first starts from a pristine document.
    pub async fn run(&mut self) -> PipelineReport {
        if self.runs > 0 {
            self.document.reset();
        }
        self.runs += 1;
        let span = info_span!("pipeline", run = self.runs, config_url = %self.settings.config_url);
        self.run_once().instrument(span).await
    }

    /// Starts over from a pristine document, as reloading the page does.
    pub async fn reload(&mut self) -> PipelineReport {
        info!("Reloading");
        if self.runs == 0 {
            self.document.reset();
        }
        self.run().await
    }

    /// Runs, then reloads a failed run up to `reloads` times. Returns the last report.
    pub async fn run_with_reloads(&mut self, reloads: u32) -> PipelineReport {
        let mut report = self.run().await;
        let mut remaining = reloads;
        while !report.is_ready() && remaining > 0 {
            remaining -= 1;
            warn!(error = report.error().unwrap_or_default(), remaining, "Run failed");
            report = self.reload().await;
        }
        report
    }

    async fn run_once(&self) -> PipelineReport {
        self.reporter.reset();
        let progress = Mutex::new(LoadProgress::new(Instant::now().into_std()));
        let terminal = TerminalController::new(
            Arc::clone(&self.document),
            self.reporter.clone(),
            self.settings.timing,
        );

        let mut stages = Stages::default();
        let settled = match self.stages(&progress, &mut stages).await {
            Ok(()) => {
                let elapsed = progress.lock().elapsed_at(Instant::now().into_std());
                terminal.succeed(elapsed).await
            },
            Err(err) => terminal.fail(&err),
        };
        // A fresh controller cannot already be settled.
        let terminal =
            settled.unwrap_or_else(|err| TerminalState::Failed { detail: err.to_string() });

        stages.transitions.push(terminal.phase());

        let progress = progress.into_inner();
        let reached_blocks = stages.transitions.contains(&Phase::LoadingBlocks);
        PipelineReport {
            run: self.runs,
            transitions: stages.transitions,
            terminal,
            fonts: stages.fonts,
            styles: stages.styles,
            blocks: stages.blocks,
            scripts: stages.scripts,
            initialization: stages.initialization,
            loaded_blocks: progress.loaded_blocks(),
            total_blocks: progress.total_blocks(),
            percent: reached_blocks.then(|| progress.percent()),
        }
    }

    async fn stages(
        &self,
        progress: &Mutex<LoadProgress>,
        stages: &mut Stages,
    ) -> Result<(), LoaderError> {
        let document = self.document.as_ref();

        self.enter(Phase::FetchingConfig, stages);
        let config = self.fetch_config().await?;

        self.enter(Phase::LoadingFonts, stages);
        stages.fonts = load_fonts(document, &config);

        self.enter(Phase::LoadingStyles, stages);
        stages.styles = load_styles(document, &config).await?;

        self.enter(Phase::LoadingBlocks, stages);
        stages.blocks =
            load_blocks(document, &self.fetcher, &config, progress, &self.reporter).await;

        self.enter(Phase::LoadingScripts, stages);
        stages.scripts = load_scripts(document, &config).await;

        self.enter(Phase::Initializing, stages);
        let settle_delay = self.settings.timing.settle_delay();
        stages.initialization =
            initialize(document, &self.hooks, config.redirect_url(), settle_delay).await;

        Ok(())
    }

    fn enter(&self, phase: Phase, stages: &mut Stages) {
        self.reporter.enter(phase);
        stages.transitions.push(phase);
    }

    async fn fetch_config(&self) -> Result<LoaderConfig, LoaderError> {
        let content =
            self.fetcher.fetch(&self.settings.config_url).await.context("Loading configuration")?;
        let document = content.into_document().context("Parsing configuration")?;
        let config: LoaderConfig =
            serde_json::from_value(document).context("Parsing configuration")?;

        info!(
            fonts = config.fonts.len(),
            styles = config.styles.len(),
            blocks = config.layout.len(),
            scripts = config.scripts.len(),
            "Configuration loaded"
        );
        Ok(config)
    }
}
