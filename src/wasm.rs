//! WASM bindings for running the course runtime in the browser.
//!
//! [`CourseSession`] wraps [`Course`] with a tracking transport backed by the
//! LMS's JavaScript `API` object, discovered from the current window.

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::deck::{build_toc, segment};
use crate::runtime::{Course, Frame, FrameWalker, TrackingApi};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// SCORM 1.2 API object living in some window.
struct JsTrackingApi {
    api: JsValue,
}

impl JsTrackingApi {
    fn call(&self, method: &str, args: &[&str]) -> JsValue {
        let Ok(func) = Reflect::get(&self.api, &JsValue::from_str(method)) else {
            return JsValue::UNDEFINED;
        };
        let Some(func) = func.dyn_ref::<Function>() else {
            return JsValue::UNDEFINED;
        };
        let result = match args {
            [] => func.call0(&self.api),
            [a] => func.call1(&self.api, &JsValue::from_str(a)),
            [a, b, ..] => func.call2(&self.api, &JsValue::from_str(a), &JsValue::from_str(b)),
        };
        result.unwrap_or(JsValue::UNDEFINED)
    }

    fn accepted(&self, method: &str, args: &[&str]) -> bool {
        let result = self.call(method, args);
        result.as_bool() == Some(true) || result.as_string().as_deref() == Some("true")
    }
}

impl TrackingApi for JsTrackingApi {
    fn initialize(&mut self, param: &str) -> bool {
        self.accepted("LMSInitialize", &[param])
    }

    fn finish(&mut self, param: &str) -> bool {
        self.accepted("LMSFinish", &[param])
    }

    fn get_value(&mut self, name: &str) -> String {
        self.call("LMSGetValue", &[name]).as_string().unwrap_or_default()
    }

    fn set_value(&mut self, name: &str, value: &str) -> bool {
        self.accepted("LMSSetValue", &[name, value])
    }

    fn commit(&mut self, param: &str) -> bool {
        self.accepted("LMSCommit", &[param])
    }
}

/// A browser window as a frame of the document hierarchy.
struct JsFrame {
    window: JsValue,
}

impl JsFrame {
    fn property(&self, name: &str) -> Option<JsValue> {
        Reflect::get(&self.window, &JsValue::from_str(name))
            .ok()
            .filter(|v| !v.is_null() && !v.is_undefined())
    }
}

impl Frame for JsFrame {
    fn api(&self) -> Option<Box<dyn TrackingApi>> {
        self.property("API")
            .map(|api| Box::new(JsTrackingApi { api }) as Box<dyn TrackingApi>)
    }

    fn parent(&self) -> Option<Box<dyn Frame>> {
        self.property("parent")
            .filter(|parent| !Object::is(parent, &self.window))
            .map(|window| Box::new(JsFrame { window }) as Box<dyn Frame>)
    }
}

/// A learner session for a deck of `total` slides.
#[wasm_bindgen]
pub struct CourseSession {
    course: Course,
}

#[wasm_bindgen]
impl CourseSession {
    /// Connect to the LMS from `window` and restore saved progress.
    #[wasm_bindgen(constructor)]
    pub fn new(window: JsValue, total: usize) -> CourseSession {
        let walker = FrameWalker::new(Box::new(JsFrame { window }));
        CourseSession {
            course: Course::start(total, &walker),
        }
    }

    #[wasm_bindgen(js_name = resumeIndex)]
    pub fn resume_index(&self) -> usize {
        self.course.resume_index()
    }

    /// Handle a slide change. Returns false if the target slide is locked.
    #[wasm_bindgen(js_name = onSlideShown)]
    pub fn on_slide_shown(&mut self, previous: Option<usize>, current: usize) -> bool {
        self.course.on_slide_shown(previous, current).is_ok()
    }

    #[wasm_bindgen(js_name = isUnlocked)]
    pub fn is_unlocked(&self, index: usize) -> bool {
        self.course.navigation().is_unlocked(index)
    }

    #[wasm_bindgen(js_name = isVisited)]
    pub fn is_visited(&self, index: usize) -> bool {
        self.course.navigation().is_visited(index)
    }

    #[wasm_bindgen(js_name = allowsKey)]
    pub fn allows_key(&self, key: &str) -> bool {
        self.course.allows_key(key)
    }

    /// Mark the course completed. Errors describe why it was refused.
    pub fn complete(&mut self) -> Result<(), JsValue> {
        self.course
            .complete()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Table of contents of a deck as a JSON string.
#[wasm_bindgen(js_name = deckToc)]
pub fn deck_toc(markdown: &str) -> Result<String, JsValue> {
    serde_json::to_string(&build_toc(&segment(markdown)))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
