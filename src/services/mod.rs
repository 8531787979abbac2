use std::sync::{Arc, RwLock};

use chrono::{Local, NaiveDateTime};
use tokio_cron_scheduler::{Job, JobScheduler};

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Time and date as shown in the dashboard header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClockFace {
    pub time: String,
    pub date: String,
}

/// Shared wall clock, written by the ticker and read by the dashboards.
#[derive(Clone, Debug, Default)]
pub struct Clock {
    face: Arc<RwLock<ClockFace>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self, now: NaiveDateTime) {
        let face = ClockFace {
            time: format_time(now),
            date: format_long_date(now),
        };
        match self.face.write() {
            Ok(mut current) => *current = face,
            Err(poisoned) => *poisoned.into_inner() = face,
        }
    }

    pub fn face(&self) -> ClockFace {
        match self.face.read() {
            Ok(face) => face.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Formats a time of day as `HH:MM:SS`.
pub fn format_time(now: NaiveDateTime) -> String {
    now.format("%H:%M:%S").to_string()
}

/// Formats a date the long way, e.g. `Monday, January 6, 2025`.
pub fn format_long_date(now: NaiveDateTime) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}

/// Starts the wall-clock ticker.
///
/// This function sets up a scheduled job that refreshes `clock` from the
/// local time once a second, using the `tokio_cron_scheduler` crate.
///
/// Parameters:
/// - `clock`: The shared clock the dashboards read from.
///
/// The function performs the following steps:
/// 1. Sets the clock once so it is never blank.
/// 2. Creates a new JobScheduler instance with a job firing every second.
/// 3. Starts the scheduler and hands it back so the caller can shut it down.
///
/// Returns:
/// - `Ok(JobScheduler)` if the job is successfully scheduled and started.
/// - `Err(Error)` if any step fails.
pub async fn start_clock(clock: Clock) -> Result<JobScheduler, Error> {
    clock.tick(Local::now().naive_local());

    let sched = JobScheduler::new().await?;

    let job = Job::new_async("* * * * * *", move |_uuid, _l| {
        let clock = clock.clone();
        Box::pin(async move {
            clock.tick(Local::now().naive_local());
        })
    })
    .map_err(|e| {
        log::error!("Failed to create clock job: {}", e);
        Box::new(e) as Error
    })?;

    sched.add(job).await.map_err(|e| {
        log::error!("Failed to add clock job to scheduler: {}", e);
        Box::new(e) as Error
    })?;

    sched.start().await?;

    log::info!("Clock ticker started");
    Ok(sched)
}
