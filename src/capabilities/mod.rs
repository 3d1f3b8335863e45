mod geolocation;
mod http;

pub use self::geolocation::{
    Geolocation, GeolocationError, GeolocationOperation, GeolocationResult, Position,
};
pub use self::http::{
    Http, HttpError, HttpHeaders, HttpMethod, HttpOperation, HttpRequest, HttpResponse,
    HttpResult, ValidatedUrl, DEFAULT_TIMEOUT_MS,
};

pub use crux_core::render::Render;

use crux_core::bridge::ResolveSerialized;
use crux_core::capability::ProtoContext;
use crux_core::render::RenderOperation;
use crux_core::{Request, WithContext};
use serde::Serialize;

use crate::event::Event;
use crate::App;

pub type AppHttp = Http<Event>;
pub type AppGeolocation = Geolocation<Event>;
pub type AppRender = Render<Event>;

pub struct Capabilities {
    pub http: AppHttp,
    pub geolocation: AppGeolocation,
    pub render: AppRender,
}

// Written out by hand rather than derived: the Effect macro chokes on the
// aliased field types above.
pub enum Effect {
    Http(Request<HttpOperation>),
    Geolocation(Request<GeolocationOperation>),
    Render(Request<RenderOperation>),
}

/// Shell-facing counterpart of [`Effect`]: carries the operation itself
/// instead of the resolvable request.
#[derive(Serialize)]
pub enum EffectFfi {
    Http(HttpOperation),
    Geolocation(GeolocationOperation),
    Render(RenderOperation),
}

impl crux_core::Effect for Effect {
    type Ffi = EffectFfi;

    fn serialize(self) -> (Self::Ffi, ResolveSerialized) {
        match self {
            Effect::Http(request) => request.serialize(EffectFfi::Http),
            Effect::Geolocation(request) => request.serialize(EffectFfi::Geolocation),
            Effect::Render(request) => request.serialize(EffectFfi::Render),
        }
    }
}

impl WithContext<App, Effect> for Capabilities {
    fn new_with_context(context: ProtoContext<Effect, Event>) -> Capabilities {
        Capabilities {
            http: Http::new(context.specialize(Effect::Http)),
            geolocation: Geolocation::new(context.specialize(Effect::Geolocation)),
            render: Render::new(context.specialize(Effect::Render)),
        }
    }
}
