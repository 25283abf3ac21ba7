use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use form_core::model::{FormDefinition, StepCounterTemplate};
use form_core::time::fixed_clock;
use services::{
    FormController, FormHandle, FormRuntime, NoHistory, PersistenceManager, PresenterState,
    WatchPresenter,
};
use storage::repository::InMemoryRepository;
use tokio::sync::watch;

use crate::context::{UiApp, build_app_context};
use crate::views::FormPage;
use crate::vm::Markers;

#[derive(Clone)]
struct TestApp {
    template: StepCounterTemplate,
    handle: FormHandle,
    state: watch::Receiver<PresenterState>,
}

impl UiApp for TestApp {
    fn title(&self) -> String {
        "Test form".to_string()
    }

    fn counter_template(&self) -> StepCounterTemplate {
        self.template.clone()
    }

    fn markers(&self) -> Markers {
        Markers::default()
    }

    fn form_handle(&self) -> FormHandle {
        self.handle.clone()
    }

    fn presenter_state(&self) -> watch::Receiver<PresenterState> {
        self.state.clone()
    }
}

#[derive(Props, Clone)]
struct FormHarnessProps {
    app: Arc<TestApp>,
}

impl PartialEq for FormHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for FormHarnessProps {}

#[component]
fn FormHarness(props: FormHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    rsx! { FormPage {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub repo: InMemoryRepository,
    pub handle: FormHandle,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub async fn setup_view_harness(json: &str) -> ViewHarness {
    setup_view_harness_with_repo(json, InMemoryRepository::new()).await
}

pub async fn setup_view_harness_with_repo(json: &str, repo: InMemoryRepository) -> ViewHarness {
    let definition = FormDefinition::from_json(json).expect("definition");
    let persistence = PersistenceManager::from_config(Arc::new(repo.clone()), &definition.config)
        .with_clock(fixed_clock());
    let (presenter, state) = WatchPresenter::channel();
    let controller = FormController::start(&definition, persistence, presenter, NoHistory, 0)
        .await
        .expect("start form");
    let (handle, _task) = FormRuntime::spawn(controller);

    let app = Arc::new(TestApp {
        template: definition.config.step_counter_template.clone(),
        handle: handle.clone(),
        state,
    });
    let dom = VirtualDom::new_with_props(FormHarness, FormHarnessProps { app });

    ViewHarness { dom, repo, handle }
}
