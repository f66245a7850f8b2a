/// Sensor sample sources
pub mod http_source;
pub mod mock_source;

pub use http_source::HttpSampleSource;
pub use mock_source::MockSampleSource;

use crate::error::SampleError;
use crate::events::Reading;
use std::future::Future;
use std::pin::Pin;

/// Trait for anything that can produce one sensor reading on demand
pub trait SampleSource: Send + Sync {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Reading, SampleError>> + Send + '_>>;
}
