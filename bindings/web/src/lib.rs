//! Browser binding for `deferload`.
//!
//! Exposes a `LibraryDelayer` class to JavaScript:
//!
//! ```js
//! import init, { install } from "./deferload_web.js";
//!
//! await init();
//! const delayer = install({
//!   libraries: { chart: ["https://cdn.example.com/chart.js"] },
//!   logLevel: "debug",
//! });
//! await delayer.load("chart", () => renderChart());
//! delayer.getRidOfInlineStyle("ad-slot", "td");
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use deferload::{strip_inline_style, LibraryRegistry, LoaderConfig, SessionManager};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

mod document;
mod logging;

pub use document::{PageElement, WebDocument};
pub use logging::init_logging;

thread_local! {
    // One manager per page: every delayer must see the same session marker
    // and the same saved native `document.write`.
    static PAGE: RefCell<Option<Rc<SessionManager<WebDocument>>>> = RefCell::new(None);
}

/// Returns the page-wide session manager, creating it on first use.
fn page_manager() -> Result<Rc<SessionManager<WebDocument>>, JsValue> {
    PAGE.with(|page| {
        if let Some(manager) = page.borrow().as_ref() {
            return Ok(Rc::clone(manager));
        }
        let document = WebDocument::from_window().map_err(to_js_error)?;
        let manager = Rc::new(SessionManager::new(document));
        *page.borrow_mut() = Some(Rc::clone(&manager));
        Ok(manager)
    })
}

/// Sets up panic reporting and console logging, then builds a
/// [`LibraryDelayer`] from `options`.
#[wasm_bindgen]
pub fn install(options: JsValue) -> Result<LibraryDelayer, JsValue> {
    console_error_panic_hook::set_once();
    let config = parse_options(options)?;
    init_logging(config.log_level.as_deref());
    LibraryDelayer::from_config(config)
}

/// Loads named script libraries through `document.write` interception.
///
/// All delayers on a page share one session manager, so loads started from
/// different delayers never overlap.
#[wasm_bindgen]
pub struct LibraryDelayer {
    registry: Rc<LibraryRegistry<WebDocument>>,
}

#[wasm_bindgen]
impl LibraryDelayer {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<LibraryDelayer, JsValue> {
        Self::from_config(parse_options(options)?)
    }

    /// Loads library `name`, then calls `callback`.
    ///
    /// Resolves with the load outcome. Rejects if the load failed, in which
    /// case `callback` is not called and the library stays loadable.
    pub fn load(&self, name: String, callback: Option<js_sys::Function>) -> js_sys::Promise {
        let registry = Rc::clone(&self.registry);
        future_to_promise(async move {
            let on_done = move || {
                if let Some(callback) = callback {
                    if let Err(err) = callback.call0(&JsValue::NULL) {
                        warn!(error = %document::describe(&err), "load callback threw");
                    }
                }
            };
            let outcome = registry.load(&name, on_done).await.map_err(to_js_error)?;
            Ok(serde_wasm_bindgen::to_value(&outcome)?)
        })
    }

    /// Strips presentational attributes from the element with `id` and its
    /// `elements` descendants. Returns the number of elements touched.
    #[wasm_bindgen(js_name = getRidOfInlineStyle)]
    pub fn get_rid_of_inline_style(&self, id: Option<String>, elements: Option<String>) -> u32 {
        let document = self.registry.manager().document();
        strip_inline_style(document, id.as_deref(), elements.as_deref()) as u32
    }

    /// Returns true if `name` is registered and not loaded yet.
    #[wasm_bindgen(js_name = isRegistered)]
    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Names of libraries not loaded yet.
    pub fn libraries(&self) -> Vec<String> {
        self.registry.names()
    }
}

impl LibraryDelayer {
    fn from_config(config: LoaderConfig) -> Result<LibraryDelayer, JsValue> {
        let manager = page_manager()?;
        let registry = LibraryRegistry::from_config(manager, config).map_err(to_js_error)?;
        Ok(Self {
            registry: Rc::new(registry),
        })
    }
}

fn parse_options(options: JsValue) -> Result<LoaderConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(LoaderConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(options)?)
}

fn to_js_error(err: deferload::Error) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
