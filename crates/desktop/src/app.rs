//! textfn Desktop: egui app state and UI.

use eframe::egui;
use std::future::Future;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use textfn::api::{LogEntry, PlaygroundApi, PlaygroundClient, SubmissionResult};
use textfn::catalog::Catalog;
use textfn::definition::FunctionDescriptor;
use textfn::error::ConfigurationError;
use textfn::form::{FunctionForm, KeywordEditor, UnaryEditor};
use textfn::submission::{SubmissionState, SubmissionTicket, SubmissionTracker};

const COPIED_LABEL_DURATION: Duration = Duration::from_millis(2500);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const UNARY_INPUT_ROWS: usize = 3;
const FUNCTION_LIST_WIDTH: f32 = 260.0;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
enum Screen {
    #[default]
    Functions,
    Logs,
}

type Reply<T> = mpsc::Receiver<Result<T, String>>;

/// Run one API call on a worker thread with its own runtime; the UI polls the receiver.
fn spawn_call<T, F, Fut>(call: F) -> Reply<T>
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, String>>,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| e.to_string())
            .and_then(|rt| rt.block_on(call()));
        let _ = tx.send(result);
    });
    rx
}

/// Take a finished reply, if any. A dropped worker counts as an error.
fn poll_reply<T>(slot: &mut Option<Reply<T>>) -> Option<Result<T, String>> {
    let rx = slot.as_ref()?;
    let result = match rx.try_recv() {
        Ok(result) => result,
        Err(mpsc::TryRecvError::Empty) => return None,
        Err(mpsc::TryRecvError::Disconnected) => Err("worker thread exited".to_string()),
    };
    *slot = None;
    Some(result)
}

/// Which copy button last fired, for the transient "Copied!" label.
#[derive(Default)]
struct CopyFeedback {
    last: Option<(String, Instant)>,
}

impl CopyFeedback {
    fn mark(&mut self, key: &str) {
        self.last = Some((key.to_string(), Instant::now()));
    }

    fn showing(&self, key: &str) -> bool {
        matches!(&self.last, Some((k, at)) if k == key && at.elapsed() < COPIED_LABEL_DURATION)
    }
}

/// Titled, copyable block of text (function output, logged input/output).
fn copyable_output(
    ui: &mut egui::Ui,
    title: &str,
    value: &str,
    key: &str,
    feedback: &mut CopyFeedback,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(title).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if feedback.showing(key) { "Copied!" } else { "Copy" };
                if ui.button(label).clicked() {
                    ui.ctx().output_mut(|o| o.copied_text = value.to_string());
                    feedback.mark(key);
                    ui.ctx().request_repaint_after(COPIED_LABEL_DURATION);
                }
            });
        });
        ui.separator();
        ui.label(egui::RichText::new(value).family(egui::FontFamily::Monospace));
    });
}

/// One function's page: its form, submission state and pending worker.
struct FunctionView {
    descriptor: FunctionDescriptor,
    form: Result<FunctionForm, ConfigurationError>,
    tracker: SubmissionTracker,
    pending: Option<(SubmissionTicket, Reply<SubmissionResult>)>,
}

impl FunctionView {
    fn new(descriptor: FunctionDescriptor) -> Self {
        let form = FunctionForm::for_descriptor(&descriptor);
        if let Err(ref e) = form {
            log::warn!("{}", e);
        }
        Self {
            descriptor,
            form,
            tracker: SubmissionTracker::new(),
            pending: None,
        }
    }

    fn can_submit(&self) -> bool {
        match &self.form {
            Ok(form) => self.tracker.can_start(form),
            Err(_) => false,
        }
    }

    /// Dispatch the current payload. Refused while a submission is in flight.
    fn start_submission(&mut self, client: &PlaygroundClient) {
        let Ok(form) = &self.form else { return };
        if !self.tracker.can_start(form) {
            return;
        }
        let Some(ticket) = self.tracker.begin() else { return };
        let form = form.clone();
        let name = self.descriptor.name.clone();
        let client = client.clone();
        log::info!("submitting {}", name);
        let rx = spawn_call(move || async move {
            textfn::submission::submit(&client, &name, &form)
                .await
                .map_err(|e| e.to_string())
        });
        self.pending = Some((ticket, rx));
    }

    fn poll_submission(&mut self) {
        let Some((ticket, rx)) = &self.pending else { return };
        let ticket = *ticket;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => Err("worker thread exited".to_string()),
        };
        self.pending = None;
        if let Err(ref e) = outcome {
            log::warn!("{} failed: {}", self.descriptor.name, e);
        }
        self.tracker.finish(ticket, outcome);
    }
}

/// Inference log browser state.
struct LogsView {
    page: u32,
    entries: Vec<LogEntry>,
    loaded_page: Option<u32>,
    error: Option<String>,
    list_receiver: Option<Reply<Vec<LogEntry>>>,
    delete_receiver: Option<Reply<String>>,
}

impl LogsView {
    fn new(page: u32) -> Self {
        Self {
            page: page.max(1),
            entries: Vec::new(),
            loaded_page: None,
            error: None,
            list_receiver: None,
            delete_receiver: None,
        }
    }

    fn busy(&self) -> bool {
        self.list_receiver.is_some() || self.delete_receiver.is_some()
    }

    fn request_page(&mut self, client: &PlaygroundClient) {
        if self.list_receiver.is_some() {
            return;
        }
        let page = self.page;
        let client = client.clone();
        self.error = None;
        self.list_receiver = Some(spawn_call(move || async move {
            client
                .list_logs(page)
                .await
                .map(|listing| listing.entries)
                .map_err(|e| e.to_string())
        }));
    }

    fn request_delete(&mut self, client: &PlaygroundClient, entry_id: String) {
        if self.delete_receiver.is_some() {
            return;
        }
        let client = client.clone();
        self.delete_receiver = Some(spawn_call(move || async move {
            client
                .delete_log(&entry_id)
                .await
                .map(|()| entry_id)
                .map_err(|e| e.to_string())
        }));
    }

    fn poll(&mut self) {
        if let Some(result) = poll_reply(&mut self.list_receiver) {
            match result {
                Ok(entries) => {
                    self.entries = entries;
                    self.loaded_page = Some(self.page);
                }
                Err(e) => {
                    self.entries.clear();
                    self.error = Some(e);
                }
            }
        }
        if let Some(result) = poll_reply(&mut self.delete_receiver) {
            match result {
                Ok(entry_id) => {
                    log::info!("deleted log entry {}", entry_id);
                    self.entries.retain(|e| e.entry_id != entry_id);
                }
                Err(e) => self.error = Some(e),
            }
        }
    }
}

pub struct PlaygroundApp {
    /// None when the config could not be loaded or the HTTP client could not be built.
    client: Option<PlaygroundClient>,
    /// Config or client setup error shown in the header.
    setup_error: Option<String>,
    /// Status snapshot, fetched once per start (or on explicit reload).
    catalog: Option<Catalog>,
    catalog_error: Option<String>,
    catalog_receiver: Option<Reply<Catalog>>,
    /// Current screen (Functions, Logs).
    current_screen: Screen,
    /// Function whose form is shown; replaced (and its state dropped) on selection change.
    function_view: Option<FunctionView>,
    logs: LogsView,
    copy_feedback: CopyFeedback,
}

impl PlaygroundApp {
    /// Space between the main screen title and the content below.
    const SCREEN_TITLE_BOTTOM_SPACING: f32 = 18.0;
    /// Space between the bottom of the content and the window edge.
    const SCREEN_FOOTER_SPACING: f32 = 48.0;

    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (client, setup_error, log_page) = match textfn::config::load_config(None) {
            Ok((config, path)) => {
                log::debug!("loaded config from {}", path.display());
                match textfn::config::client_from_config(&config, None) {
                    Ok(client) => (Some(client), None, config.logs.page),
                    Err(e) => (None, Some(format!("{:#}", e)), config.logs.page),
                }
            }
            Err(e) => (None, Some(format!("{:#}", e)), 1),
        };
        let mut app = Self {
            client,
            setup_error,
            catalog: None,
            catalog_error: None,
            catalog_receiver: None,
            current_screen: Screen::default(),
            function_view: None,
            logs: LogsView::new(log_page),
            copy_feedback: CopyFeedback::default(),
        };
        app.request_catalog();
        log::info!("desktop started");
        app
    }

    fn request_catalog(&mut self) {
        let Some(client) = self.client.clone() else { return };
        if self.catalog_receiver.is_some() {
            return;
        }
        self.catalog_error = None;
        self.catalog_receiver = Some(spawn_call(move || async move {
            Catalog::fetch(&client).await.map_err(|e| e.to_string())
        }));
    }

    fn poll_catalog(&mut self) {
        if let Some(result) = poll_reply(&mut self.catalog_receiver) {
            match result {
                Ok(catalog) => {
                    log::info!("loaded {} functions", catalog.len());
                    self.catalog = Some(catalog);
                }
                Err(e) => {
                    log::warn!("status request failed: {}", e);
                    self.catalog_error = Some(e);
                }
            }
        }
    }

    fn select_function(&mut self, descriptor: &FunctionDescriptor) {
        if self
            .function_view
            .as_ref()
            .is_some_and(|v| v.descriptor.name == descriptor.name)
        {
            return;
        }
        self.function_view = Some(FunctionView::new(descriptor.clone()));
    }

    fn pending_work(&self) -> bool {
        self.catalog_receiver.is_some()
            || self.logs.busy()
            || self.function_view.as_ref().is_some_and(|v| v.pending.is_some())
    }

    fn ui_function_list(&mut self, ui: &mut egui::Ui) {
        ui.add_space(24.0);
        ui.heading("Functions");
        ui.add_space(Self::SCREEN_TITLE_BOTTOM_SPACING);
        if self.catalog_receiver.is_some() {
            ui.add(egui::Spinner::new());
        }
        if let Some(ref e) = self.catalog_error {
            ui.colored_label(ui.visuals().error_fg_color, format!("Could not load functions: {}", e));
            if ui.button("Retry").clicked() {
                self.request_catalog();
            }
        }
        let Some(catalog) = self.catalog.clone() else { return };
        if catalog.is_empty() {
            ui.label("The server has no functions.");
            return;
        }
        let selected = self.function_view.as_ref().map(|v| v.descriptor.name.clone());
        egui::ScrollArea::vertical()
            .id_source("function_list")
            .show(ui, |ui| {
                for descriptor in catalog.functions() {
                    let mut text = egui::RichText::new(&descriptor.name);
                    if textfn::form::resolve(descriptor).is_err() {
                        text = text.color(ui.visuals().warn_fg_color);
                    }
                    let is_selected = selected.as_deref() == Some(descriptor.name.as_str());
                    if ui.selectable_label(is_selected, text).clicked() {
                        self.select_function(descriptor);
                    }
                }
            });
    }

    fn ui_keyword_editor(ui: &mut egui::Ui, editor: &mut KeywordEditor) {
        let mut remove: Option<String> = None;
        for row in editor.display_entries() {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&row.name).monospace().strong());
                ui.label("=");
                let button_width = if row.required { 0.0 } else { 32.0 };
                let mut value = row.value.clone();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut value)
                        .desired_width(ui.available_width() - button_width),
                );
                if response.changed() {
                    editor.update_value(&row.name, value);
                }
                if !row.required && ui.button("✕").on_hover_text("Remove").clicked() {
                    remove = Some(row.name.clone());
                }
            });
        }
        if let Some(name) = remove {
            editor.remove_entry(&name);
        }
        if editor.display_entries().is_empty() {
            ui.label("No arguments yet.");
        }

        ui.add_space(8.0);
        egui::CollapsingHeader::new("New Keyword Argument")
            .default_open(false)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(editor.draft_name_mut())
                            .hint_text("Argument Name")
                            .desired_width(180.0),
                    );
                    ui.label("=");
                    ui.add(
                        egui::TextEdit::multiline(editor.draft_value_mut())
                            .hint_text("Argument Value")
                            .desired_rows(1)
                            .desired_width(f32::INFINITY),
                    );
                });
                ui.horizontal(|ui| {
                    let label = if editor.draft_name().is_empty() {
                        "Add".to_string()
                    } else {
                        format!("Add keyword: {}", editor.draft_name())
                    };
                    if ui
                        .add_enabled(editor.can_add_draft(), egui::Button::new(label))
                        .clicked()
                    {
                        editor.add_draft();
                    }
                    if ui.button("Clear").clicked() {
                        editor.clear_draft();
                    }
                });
            });
    }

    fn ui_unary_editor(ui: &mut egui::Ui, editor: &mut UnaryEditor) {
        ui.label(egui::RichText::new("Input:").small().strong());
        ui.add(
            egui::TextEdit::multiline(editor.value_mut())
                .desired_rows(UNARY_INPUT_ROWS)
                .desired_width(f32::INFINITY),
        );
        if !editor.allow_none() && editor.value().is_empty() {
            ui.label(egui::RichText::new("Input is required.").small());
        }
    }

    fn ui_function_screen(&mut self, ui: &mut egui::Ui) {
        ui.add_space(24.0);
        if let Some(ref catalog) = self.catalog {
            if !catalog.has_key() {
                ui.colored_label(
                    ui.visuals().warn_fg_color,
                    "The playground server has no model API key configured; inference will fail.",
                );
                ui.add_space(8.0);
            }
        }
        let client = self.client.clone();
        let feedback = &mut self.copy_feedback;
        let Some(view) = self.function_view.as_mut() else {
            ui.label("Select a function.");
            return;
        };

        ui.heading(&view.descriptor.name);
        ui.add_space(Self::SCREEN_TITLE_BOTTOM_SPACING);
        if !view.descriptor.description.is_empty() {
            ui.label(view.descriptor.description.trim());
            ui.add_space(12.0);
        }

        egui::ScrollArea::vertical()
            .id_source("function_view")
            .show(ui, |ui| {
                match &mut view.form {
                    Err(e) => {
                        ui.colored_label(ui.visuals().error_fg_color, format!("Function misconfigured: {}", e));
                        return;
                    }
                    Ok(FunctionForm::NoArgs) => {
                        ui.label("This function takes no input.");
                    }
                    Ok(FunctionForm::Keyword(editor)) => Self::ui_keyword_editor(ui, editor),
                    Ok(FunctionForm::Unary(editor)) => Self::ui_unary_editor(ui, editor),
                }

                ui.add_space(12.0);
                ui.separator();
                ui.horizontal(|ui| {
                    let enabled = client.is_some() && view.can_submit();
                    if ui.add_enabled(enabled, egui::Button::new("Submit")).clicked() {
                        if let Some(ref client) = client {
                            view.start_submission(client);
                        }
                    }
                    if let Ok(ref form) = view.form {
                        let missing = form.missing_required();
                        if !missing.is_empty() {
                            ui.label(format!("Required: {}", missing.join(", ")));
                        }
                    }
                });
                ui.add_space(12.0);

                match view.tracker.state() {
                    SubmissionState::Idle => {}
                    SubmissionState::InFlight => {
                        ui.add(egui::Spinner::new());
                    }
                    SubmissionState::Failed(e) => {
                        ui.colored_label(ui.visuals().error_fg_color, format!("Something is wrong. {}", e));
                    }
                    SubmissionState::Succeeded(result) => {
                        let rendered = result.render();
                        copyable_output(ui, "Function Output", &rendered, "function-output", feedback);
                    }
                }
                ui.add_space(Self::SCREEN_FOOTER_SPACING);
            });
    }

    fn ui_logs_screen(&mut self, ui: &mut egui::Ui) {
        ui.add_space(24.0);
        ui.heading("Logs");
        ui.add_space(Self::SCREEN_TITLE_BOTTOM_SPACING);

        let Some(client) = self.client.clone() else {
            ui.label("No playground server configured.");
            return;
        };
        if self.logs.loaded_page != Some(self.logs.page)
            && self.logs.list_receiver.is_none()
            && self.logs.error.is_none()
        {
            self.logs.request_page(&client);
        }

        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.logs.page > 1 && !self.logs.busy(), egui::Button::new("Previous"))
                .clicked()
            {
                self.logs.page -= 1;
                self.logs.request_page(&client);
            }
            ui.label(format!("Page {}", self.logs.page));
            let has_next = !self.logs.entries.is_empty();
            if ui
                .add_enabled(has_next && !self.logs.busy(), egui::Button::new("Next"))
                .clicked()
            {
                self.logs.page += 1;
                self.logs.request_page(&client);
            }
            if ui.add_enabled(!self.logs.busy(), egui::Button::new("Refresh")).clicked() {
                self.logs.request_page(&client);
            }
            if self.logs.busy() {
                ui.add(egui::Spinner::new());
            }
        });
        ui.add_space(8.0);

        if let Some(ref e) = self.logs.error {
            ui.colored_label(ui.visuals().error_fg_color, format!("Something is wrong. {}", e));
        }

        let mut delete: Option<String> = None;
        let feedback = &mut self.copy_feedback;
        let entries = &self.logs.entries;
        let available = ui.available_height();
        let scroll_height = (available - Self::SCREEN_FOOTER_SPACING).max(0.0);
        egui::ScrollArea::vertical()
            .id_source("log_entries")
            .max_height(scroll_height)
            .show(ui, |ui| {
                for (i, entry) in entries.iter().enumerate() {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new(format!("{}. Function: {}", i + 1, entry.fn_name)).strong(),
                            );
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if ui.button("Delete").clicked() {
                                    delete = Some(entry.entry_id.clone());
                                }
                            });
                        });
                        ui.label(
                            egui::RichText::new(format!("time: {}", textfn::logs::format_entry_time(entry)))
                                .small()
                                .strong(),
                        );
                        ui.add_space(8.0);
                        copyable_output(
                            ui,
                            "Function Input",
                            &textfn::logs::display_data_item(entry.input_data.as_ref()),
                            &format!("{}-input", entry.entry_id),
                            feedback,
                        );
                        ui.add_space(8.0);
                        copyable_output(
                            ui,
                            "Function Output",
                            &textfn::logs::display_data_item(entry.output_data.as_ref()),
                            &format!("{}-output", entry.entry_id),
                            feedback,
                        );
                    });
                    ui.add_space(12.0);
                }
                if entries.is_empty() && self.logs.list_receiver.is_none() && self.logs.error.is_none() {
                    ui.label("No log entries on this page.");
                }
            });
        if let Some(entry_id) = delete {
            self.logs.request_delete(&client, entry_id);
        }
        ui.add_space(Self::SCREEN_FOOTER_SPACING);
    }
}

impl eframe::App for PlaygroundApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_catalog();
        self.logs.poll();
        if let Some(view) = self.function_view.as_mut() {
            view.poll_submission();
        }

        // Header with title and server address
        let mut reload = false;
        let base_url = self.client.as_ref().map(|c| c.base_url().to_string());
        let setup_error = self.setup_error.as_deref();
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                .show(ui, |ui| {
                    ui.add_space(16.0);
                    ui.horizontal(|ui| {
                        ui.heading("textfn playground");
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if let Some(ref url) = base_url {
                                reload = ui.button("Reload functions").clicked();
                                ui.label(url);
                            } else if let Some(e) = setup_error {
                                ui.colored_label(ui.visuals().error_fg_color, e);
                            }
                        });
                    });
                    ui.add_space(16.0);
                });
        });
        if reload {
            self.catalog = None;
            self.function_view = None;
            self.request_catalog();
        }

        let current_screen = &mut self.current_screen;
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(140.0)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                    .show(ui, |ui| {
                        ui.add_space(24.0);
                        if ui
                            .selectable_label(*current_screen == Screen::Functions, "Functions")
                            .clicked()
                        {
                            *current_screen = Screen::Functions;
                        }
                        ui.add_space(12.0);
                        if ui.selectable_label(*current_screen == Screen::Logs, "Logs").clicked() {
                            *current_screen = Screen::Logs;
                        }
                    });
            });

        if self.current_screen == Screen::Functions {
            egui::SidePanel::left("functions_panel")
                .resizable(true)
                .default_width(FUNCTION_LIST_WIDTH)
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .inner_margin(egui::Margin::symmetric(16.0, 0.0))
                        .show(ui, |ui| {
                            self.ui_function_list(ui);
                        });
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                .show(ui, |ui| match self.current_screen {
                    Screen::Functions => self.ui_function_screen(ui),
                    Screen::Logs => self.ui_logs_screen(ui),
                });
        });

        if self.pending_work() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
