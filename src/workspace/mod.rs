//! The authoring workspace.
//!
//! One [`Workspace`] owns the editor, the pending-work queue, the library
//! view, the active orchestration session and any running media poll. Every
//! user interaction is an [`Action`] routed through [`Workspace::dispatch`].
//! The layout only decides which panels are showing; the behaviour is the
//! same for all of them.

mod clipboard;
mod layout;

pub use clipboard::{Clipboard, MemoryClipboard};
#[cfg(feature = "clipboard")]
pub use clipboard::SystemClipboard;
pub use layout::{Layout, Panel, PanelState, WIZARD_STEPS};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::core::{
    Config, ContentItem, ContentStatus, ContentStore, ContentType, OrchestrationSession, Priority,
    Queue, WorkspaceContext,
};
use crate::gateway::{
    adapt_for_audiences, AdaptationRequest, GatewayError, GenerationGateway, GenerationOptions,
    GenerationRequest, HttpGenerationGateway,
};
use crate::library::{HttpLibraryClient, Library, LibraryStore, SaveReceipt, DEFAULT_PAGE_SIZE};
use crate::media::{
    HttpMediaGateway, MediaGateway, MediaPoller, PollConfig, PollHandle, VisualRequest,
    VisualResponse,
};

/// Workspace settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub layout: Layout,
    /// Rows fetched per library refresh
    pub page_size: usize,
    pub poll: PollConfig,
    /// How long a save takes when no library is wired
    pub simulated_save_delay: Duration,
    pub default_tone: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            page_size: DEFAULT_PAGE_SIZE,
            poll: PollConfig::default(),
            simulated_save_delay: Duration::from_secs(1),
            default_tone: "professional".to_string(),
        }
    }
}

impl From<&Config> for WorkspaceConfig {
    fn from(config: &Config) -> Self {
        Self {
            layout: config.general.layout,
            page_size: config.library.page_size,
            poll: PollConfig::from(&config.media),
            simulated_save_delay: config.editor.simulated_save_delay(),
            default_tone: config.editor.default_tone.clone(),
        }
    }
}

/// Remote services the workspace talks to. Any of them may be absent.
#[derive(Clone, Default)]
pub struct Services {
    pub generation: Option<Arc<dyn GenerationGateway>>,
    pub library: Option<Arc<dyn LibraryStore>>,
    pub media: Option<Arc<dyn MediaGateway>>,
}

impl Services {
    pub fn none() -> Self {
        Self::default()
    }

    /// Wire every endpoint that has a URL configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let generation = HttpGenerationGateway::from_config(&config.api)
            .context("Failed to create generation client")?
            .map(|g| Arc::new(g) as Arc<dyn GenerationGateway>);
        let library = HttpLibraryClient::from_config(&config.api)
            .context("Failed to create library client")?
            .map(|l| Arc::new(l) as Arc<dyn LibraryStore>);
        let media = HttpMediaGateway::from_config(&config.api)
            .context("Failed to create media client")?
            .map(|m| Arc::new(m) as Arc<dyn MediaGateway>);

        Ok(Self { generation, library, media })
    }

    pub fn with_generation(mut self, gateway: Arc<dyn GenerationGateway>) -> Self {
        self.generation = Some(gateway);
        self
    }

    pub fn with_library(mut self, library: Arc<dyn LibraryStore>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn with_media(mut self, media: Arc<dyn MediaGateway>) -> Self {
        self.media = Some(media);
        self
    }
}

/// Something the user did.
#[derive(Debug, Clone)]
pub enum Action {
    /// Start a fresh item of a type
    SelectType(ContentType),
    SetTitle(String),
    SetBody(String),
    SetStatus(ContentStatus),
    SetPriority(Priority),
    /// Draft the body from the context
    Generate { options: GenerationOptions, instructions: String },
    /// Produce one version per audience from the current body
    Adapt { audiences: Vec<String> },
    Save,
    RefreshLibrary,
    /// Load a library row into the editor
    OpenFromLibrary(String),
    /// Copy the current body
    CopyBody,
    /// Copy one version's body
    CopyVersion(usize),
    TogglePanel(Panel),
    NextStep,
    PreviousStep,
    QueueStart(String),
    QueueComplete(String),
    /// Track the active framework's content needs
    StartOrchestration,
    RequestVisual(VisualRequest),
    StopVisual,
}

/// What an action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The current item changed
    Updated,
    Generated { succeeded: bool },
    Adapted { added: usize },
    Saved { receipt: SaveReceipt, queued: bool },
    /// `stale` is set when the fetch failed and the previous rows remain
    Refreshed { rows: usize, stale: bool },
    Copied { chars: usize },
    Panels(Vec<Panel>),
    QueueUpdated,
    OrchestrationStarted { needs: usize },
    Images(Vec<String>),
    VisualJob(String),
    VisualStopped,
}

/// The authoring workspace.
pub struct Workspace {
    config: WorkspaceConfig,
    context: WorkspaceContext,
    services: Services,
    store: ContentStore,
    queue: Queue,
    library: Library,
    panels: PanelState,
    orchestration: Option<OrchestrationSession>,
    clipboard: Box<dyn Clipboard>,
    images: Vec<String>,
    visual_job: Option<PollHandle>,
}

impl Workspace {
    pub fn new(config: WorkspaceConfig, context: WorkspaceContext, services: Services) -> Self {
        Self {
            library: Library::new(config.page_size),
            panels: PanelState::new(config.layout),
            config,
            context,
            services,
            store: ContentStore::new(),
            queue: Queue::new(),
            orchestration: None,
            clipboard: Box::new(MemoryClipboard::new()),
            images: Vec::new(),
            visual_job: None,
        }
    }

    /// Replace the clipboard backend.
    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Route one action.
    pub async fn dispatch(&mut self, action: Action) -> anyhow::Result<Outcome> {
        tracing::debug!(?action, "Dispatching action");

        match action {
            Action::SelectType(content_type) => {
                self.select_type(content_type);
                Ok(Outcome::Updated)
            }
            Action::SetTitle(title) => {
                self.store.set_title(title)?;
                Ok(Outcome::Updated)
            }
            Action::SetBody(body) => {
                self.store.set_body(body)?;
                Ok(Outcome::Updated)
            }
            Action::SetStatus(status) => {
                self.store.set_status(status)?;
                Ok(Outcome::Updated)
            }
            Action::SetPriority(priority) => {
                self.store.set_priority(priority)?;
                Ok(Outcome::Updated)
            }
            Action::Generate { options, instructions } => {
                self.generate(options, &instructions).await
            }
            Action::Adapt { audiences } => self.adapt(audiences).await,
            Action::Save => self.save().await,
            Action::RefreshLibrary => self.refresh_library().await,
            Action::OpenFromLibrary(row_id) => {
                self.open_from_library(&row_id)?;
                Ok(Outcome::Updated)
            }
            Action::CopyBody => {
                let body = self.current_item()?.body.clone();
                self.copy(&body)
            }
            Action::CopyVersion(index) => {
                let body = self
                    .current_item()?
                    .versions
                    .get(index)
                    .map(|v| v.body.clone())
                    .with_context(|| format!("No version at index {index}"))?;
                self.copy(&body)
            }
            Action::TogglePanel(panel) => {
                self.panels.toggle(panel);
                Ok(Outcome::Panels(self.panels.visible()))
            }
            Action::NextStep => {
                self.panels.next_step();
                Ok(Outcome::Panels(self.panels.visible()))
            }
            Action::PreviousStep => {
                self.panels.previous_step();
                Ok(Outcome::Panels(self.panels.visible()))
            }
            Action::QueueStart(item_id) => {
                self.queue.start(&item_id)?;
                Ok(Outcome::QueueUpdated)
            }
            Action::QueueComplete(item_id) => {
                self.queue.complete(&item_id)?;
                self.complete_need(&item_id);
                Ok(Outcome::QueueUpdated)
            }
            Action::StartOrchestration => {
                let framework =
                    self.context.framework.as_ref().context("No framework is active")?;
                let session = OrchestrationSession::from_framework(framework);
                let needs = session.needs().len();
                tracing::info!(framework_id = %framework.id, needs, "Started orchestration");
                self.orchestration = Some(session);
                Ok(Outcome::OrchestrationStarted { needs })
            }
            Action::RequestVisual(request) => self.request_visual(request).await,
            Action::StopVisual => {
                if let Some(mut handle) = self.visual_job.take() {
                    handle.stop();
                }
                Ok(Outcome::VisualStopped)
            }
        }
    }

    fn select_type(&mut self, content_type: ContentType) {
        let item_id =
            self.store.select_type(content_type, self.context.framework.as_ref()).id.clone();

        if let Some(session) = self.orchestration.as_mut() {
            if let Some(index) = session.next_pending(content_type) {
                if let Err(e) = session.start(index, item_id) {
                    tracing::warn!(error = %e, "Could not start content need");
                }
            }
        }

        self.panels.focus(Panel::Editor);
    }

    async fn generate(
        &mut self,
        options: GenerationOptions,
        instructions: &str,
    ) -> anyhow::Result<Outcome> {
        let content_type = self.current_item()?.content_type;
        let options = if options.tone.is_empty() {
            GenerationOptions { tone: self.config.default_tone.clone(), ..options }
        } else {
            options
        };

        let request = GenerationRequest::new(content_type, self.context.clone(), options)
            .with_instructions(instructions);

        let result = match &self.services.generation {
            Some(gateway) => gateway.generate(&request).await,
            None => Err(GatewayError::NotConfigured),
        };

        let succeeded = self.store.apply_generation(result)?;
        Ok(Outcome::Generated { succeeded })
    }

    async fn adapt(&mut self, audiences: Vec<String>) -> anyhow::Result<Outcome> {
        let source_text = self.current_item()?.body.clone();
        if audiences.is_empty() {
            return Ok(Outcome::Adapted { added: 0 });
        }

        let request = AdaptationRequest { source_text, audiences, context: self.context.clone() };
        let result = match &self.services.generation {
            Some(gateway) => adapt_for_audiences(gateway.as_ref(), &request).await,
            None => Err(GatewayError::NotConfigured),
        };

        let added = self.store.apply_adaptation(result)?;
        if added > 0 {
            self.panels.focus(Panel::Versions);
        }
        Ok(Outcome::Adapted { added })
    }

    async fn save(&mut self) -> anyhow::Result<Outcome> {
        let receipt = self
            .store
            .save(self.services.library.as_deref(), &self.context, self.config.simulated_save_delay)
            .await
            .context("Failed to save content")?;

        let item = self.store.current().context("No content item is open")?;
        let queued = self.queue.record_save(item);
        let (item_id, status) = (item.id.clone(), item.status);

        if status == ContentStatus::Completed {
            self.complete_need(&item_id);
        }

        tracing::info!(%item_id, queued, "Saved content item");
        self.panels.focus(Panel::Library);
        Ok(Outcome::Saved { receipt, queued })
    }

    async fn refresh_library(&mut self) -> anyhow::Result<Outcome> {
        let store = self.services.library.as_deref().context("No content library is configured")?;

        let stale =
            self.library.refresh(store, self.context.organization_id()).await.is_err();
        Ok(Outcome::Refreshed { rows: self.library.rows().len(), stale })
    }

    fn open_from_library(&mut self, row_id: &str) -> anyhow::Result<()> {
        let row = self
            .library
            .find(row_id)
            .with_context(|| format!("Library row not found: {row_id}"))?;
        let content_type: ContentType = row.content_type.parse()?;

        let mut item = ContentItem::new(row.id.clone(), content_type, row.title.clone());
        item.body = row.body_text();
        item.status = if row.is_draft() { ContentStatus::Draft } else { ContentStatus::InProgress };
        item.touch();

        self.store.open(item);
        self.panels.focus(Panel::Editor);
        Ok(())
    }

    fn copy(&mut self, text: &str) -> anyhow::Result<Outcome> {
        self.clipboard.set_text(text).context("Failed to copy to clipboard")?;
        Ok(Outcome::Copied { chars: text.chars().count() })
    }

    async fn request_visual(&mut self, mut request: VisualRequest) -> anyhow::Result<Outcome> {
        let gateway = self.services.media.clone().context("Visual generation is not configured")?;

        if request.framework.is_none() {
            request.framework = self.context.framework.clone();
        }

        let response =
            gateway.generate(&request).await.context("Visual generation request failed")?;
        self.panels.focus(Panel::Visual);

        match response {
            VisualResponse::Images(urls) => {
                self.images = urls.clone();
                Ok(Outcome::Images(urls))
            }
            VisualResponse::Job(job_id) => {
                // Replacing the handle aborts any poll still running.
                let handle = MediaPoller::start(gateway, job_id.clone(), self.config.poll);
                self.visual_job = Some(handle);
                Ok(Outcome::VisualJob(job_id))
            }
        }
    }

    /// Advance the need an item was started for, if it is in progress.
    fn complete_need(&mut self, item_id: &str) {
        let Some(session) = self.orchestration.as_mut() else {
            return;
        };
        let Some(index) = session.need_for_item(item_id) else {
            return;
        };

        if session.needs()[index].status == ContentStatus::InProgress {
            if let Err(e) = session.complete(index) {
                tracing::warn!(error = %e, "Could not complete content need");
            }
        }
    }

    fn current_item(&self) -> anyhow::Result<&ContentItem> {
        self.store.current().context("No content item is open")
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn context(&self) -> &WorkspaceContext {
        &self.context
    }

    /// Switch context. The orchestration session belongs to the old
    /// framework and is dropped.
    pub fn set_context(&mut self, context: WorkspaceContext) {
        self.context = context;
        self.orchestration = None;
    }

    pub fn current(&self) -> Option<&ContentItem> {
        self.store.current()
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn panels(&self) -> &PanelState {
        &self.panels
    }

    pub fn orchestration(&self) -> Option<&OrchestrationSession> {
        self.orchestration.as_ref()
    }

    /// Image URLs from the last immediate visual response.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn visual_job(&self) -> Option<&PollHandle> {
        self.visual_job.as_ref()
    }

    /// Take ownership of the running poll, e.g. to wait on it.
    pub fn take_visual_job(&mut self) -> Option<PollHandle> {
        self.visual_job.take()
    }

    pub fn clipboard_text(&mut self) -> anyhow::Result<String> {
        self.clipboard.get_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContentNeed, Framework, Organization};

    fn context() -> WorkspaceContext {
        WorkspaceContext::new(Organization::new("org-1", "Acme")).with_framework(
            Framework::new("fw", "Spring Launch").with_content_needs(vec![
                ContentNeed::new(ContentType::PressRelease, "announce"),
                ContentNeed::new(ContentType::SocialPost, "amplify"),
            ]),
        )
    }

    fn workspace(layout: Layout) -> Workspace {
        let config = WorkspaceConfig {
            layout,
            simulated_save_delay: Duration::ZERO,
            ..WorkspaceConfig::default()
        };
        Workspace::new(config, context(), Services::none())
    }

    #[tokio::test]
    async fn test_actions_need_an_open_item() {
        let mut ws = workspace(Layout::Sidebar);
        assert!(ws.dispatch(Action::SetBody("x".into())).await.is_err());
        assert!(ws.dispatch(Action::Save).await.is_err());
        assert!(ws.dispatch(Action::CopyBody).await.is_err());
    }

    #[tokio::test]
    async fn test_select_type_uses_framework_title() {
        let mut ws = workspace(Layout::Sidebar);
        ws.dispatch(Action::SelectType(ContentType::PressRelease)).await.unwrap();
        assert_eq!(ws.current().unwrap().title, "Press Release: Spring Launch");
    }

    #[tokio::test]
    async fn test_generate_without_gateway_uses_placeholder() {
        let mut ws = workspace(Layout::Sidebar);
        ws.dispatch(Action::SelectType(ContentType::Email)).await.unwrap();

        let outcome = ws
            .dispatch(Action::Generate {
                options: GenerationOptions::default(),
                instructions: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Generated { succeeded: false });
        assert_eq!(ws.current().unwrap().body, crate::gateway::GENERATION_FAILED_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_adapt_without_gateway_adds_nothing() {
        let mut ws = workspace(Layout::Sidebar);
        ws.dispatch(Action::SelectType(ContentType::Email)).await.unwrap();
        let outcome =
            ws.dispatch(Action::Adapt { audiences: vec!["press".into()] }).await.unwrap();
        assert_eq!(outcome, Outcome::Adapted { added: 0 });
    }

    #[tokio::test]
    async fn test_orchestration_advances_on_save() {
        let mut ws = workspace(Layout::Sidebar);
        ws.dispatch(Action::StartOrchestration).await.unwrap();

        ws.dispatch(Action::SelectType(ContentType::PressRelease)).await.unwrap();
        assert_eq!(ws.orchestration().unwrap().progress().in_progress, 1);

        ws.dispatch(Action::Save).await.unwrap();
        let progress = ws.orchestration().unwrap().progress();
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.in_progress, 0);
        assert_eq!(ws.orchestration().unwrap().percent_complete(), 50);
    }

    #[tokio::test]
    async fn test_orchestration_advances_on_queue_complete() {
        let mut ws = workspace(Layout::Sidebar);
        ws.dispatch(Action::StartOrchestration).await.unwrap();
        ws.dispatch(Action::SelectType(ContentType::SocialPost)).await.unwrap();
        ws.dispatch(Action::SetStatus(ContentStatus::Draft)).await.unwrap();

        let outcome = ws.dispatch(Action::Save).await.unwrap();
        assert!(matches!(outcome, Outcome::Saved { queued: true, .. }));
        assert_eq!(ws.orchestration().unwrap().progress().completed, 0);

        let item_id = ws.current().unwrap().id.clone();
        ws.dispatch(Action::QueueStart(item_id.clone())).await.unwrap();
        ws.dispatch(Action::QueueComplete(item_id)).await.unwrap();
        assert_eq!(ws.orchestration().unwrap().progress().completed, 1);
    }

    #[tokio::test]
    async fn test_orchestration_requires_framework() {
        let mut ws = Workspace::new(
            WorkspaceConfig::default(),
            WorkspaceContext::new(Organization::new("org", "Acme")),
            Services::none(),
        );
        assert!(ws.dispatch(Action::StartOrchestration).await.is_err());
    }

    #[tokio::test]
    async fn test_copy_body_and_version() {
        let mut ws = workspace(Layout::Sidebar);
        ws.dispatch(Action::SelectType(ContentType::Email)).await.unwrap();
        ws.dispatch(Action::SetBody("héllo world".into())).await.unwrap();

        let outcome = ws.dispatch(Action::CopyBody).await.unwrap();
        assert_eq!(outcome, Outcome::Copied { chars: 11 });
        assert_eq!(ws.clipboard_text().unwrap(), "héllo world");
        assert!(ws.dispatch(Action::CopyVersion(0)).await.is_err());
    }

    #[tokio::test]
    async fn test_wizard_follows_the_flow() {
        let mut ws = workspace(Layout::Wizard);
        assert_eq!(ws.panels().wizard_step(), Some(Panel::TypePicker));

        ws.dispatch(Action::SelectType(ContentType::Email)).await.unwrap();
        assert_eq!(ws.panels().wizard_step(), Some(Panel::Editor));

        ws.dispatch(Action::Save).await.unwrap();
        assert_eq!(ws.panels().wizard_step(), Some(Panel::Library));

        let outcome = ws.dispatch(Action::PreviousStep).await.unwrap();
        assert_eq!(outcome, Outcome::Panels(vec![Panel::Versions]));
    }

    #[tokio::test]
    async fn test_visual_and_library_require_services() {
        let mut ws = workspace(Layout::Split);
        assert!(ws.dispatch(Action::RefreshLibrary).await.is_err());
        assert!(ws
            .dispatch(Action::RequestVisual(VisualRequest::new(crate::media::VisualKind::Image)))
            .await
            .is_err());
        assert_eq!(ws.dispatch(Action::StopVisual).await.unwrap(), Outcome::VisualStopped);
    }

    #[test]
    fn test_workspace_config_from_config() {
        let mut config = Config::default();
        config.general.layout = Layout::Split;
        config.editor.simulated_save_ms = 250;

        let ws_config = WorkspaceConfig::from(&config);
        assert_eq!(ws_config.layout, Layout::Split);
        assert_eq!(ws_config.simulated_save_delay, Duration::from_millis(250));
        assert_eq!(ws_config.poll, PollConfig::default());
    }

    #[test]
    fn test_services_from_default_config_are_empty() {
        let services = Services::from_config(&Config::default()).unwrap();
        assert!(services.generation.is_none());
        assert!(services.library.is_none());
        assert!(services.media.is_none());
    }
}
