mod delay;
mod http;
mod kv;

pub use self::delay::{Delay, DelayOperation, DelayOutput};
pub use self::http::{
    Http, HttpError, HttpHeaders, HttpMethod, HttpOperation, HttpOutput, HttpRequest,
    HttpResponse, HttpResult, ValidatedUrl,
};
pub use self::kv::{Kv, KvError, KvKey, KvOperation, KvOutput, KvResult};

// We use Crux's built-in Render capability directly because it provides
// all necessary functionality for triggering view updates.
pub use crux_core::render::Render;

use crate::{App, Event};

pub type AppHttp = Http<Event>;
pub type AppKv = Kv<Event>;
pub type AppDelay = Delay<Event>;
pub type AppRender = Render<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: AppHttp,
    pub kv: AppKv,
    pub delay: AppDelay,
    pub render: AppRender,
}
