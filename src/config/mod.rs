pub mod metrics;
pub mod settings;

pub use metrics::{MetricSpec, Unit, default_metrics};
pub use settings::{
    AppConfig, DataSettings, PublishSettings, RankingSettings, SchedulePolicy, ScheduleSettings,
};
