use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

/// 每天的活跃时段 `[start_hour, end_hour)`
///
/// `start_hour > end_hour` 表示跨越午夜（例如 22 点到次日 4 点）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    start_hour: u32,
    end_hour: u32,
}

impl ScheduleWindow {
    /// 小时必须小于 24 且起止不同，由配置校验保证
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour: start_hour % 24,
            end_hour: end_hour % 24,
        }
    }

    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        let hour = now.hour();
        if self.start_hour < self.end_hour {
            (self.start_hour..self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// 严格晚于 `now` 的下一个活跃时段起点
    pub fn next_active_start(&self, now: NaiveDateTime) -> NaiveDateTime {
        let start = NaiveTime::from_hms_opt(self.start_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        let today = now.date().and_time(start);
        if today > now {
            today
        } else {
            today + Duration::days(1)
        }
    }
}
