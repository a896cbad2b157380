mod background;
mod compositor;

pub use background::BackgroundProvider;
pub use compositor::composite;
