/// 每日发布目标与进度
///
/// 对外可观察时始终满足 `0 <= posted_count <= daily_goal`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostGoal {
    daily_goal: u32,
    posted_count: u32,
}

impl PostGoal {
    pub fn new(daily_goal: u32) -> Self {
        Self {
            daily_goal,
            posted_count: 0,
        }
    }

    pub fn daily_goal(&self) -> u32 {
        self.daily_goal
    }

    pub fn posted_count(&self) -> u32 {
        self.posted_count
    }

    pub fn remaining(&self) -> u32 {
        self.daily_goal - self.posted_count
    }

    pub fn is_met(&self) -> bool {
        self.posted_count >= self.daily_goal
    }

    /// 新周期：重新设定目标并清零计数
    pub fn reset(&mut self, daily_goal: u32) {
        self.daily_goal = daily_goal;
        self.posted_count = 0;
    }

    /// 记录一次确认成功的发布；目标已满时不再增加
    pub fn record_success(&mut self) -> bool {
        if self.is_met() {
            return false;
        }
        self.posted_count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_success_never_exceeds_goal() {
        let mut goal = PostGoal::new(2);
        assert!(goal.record_success());
        assert!(goal.record_success());
        assert!(!goal.record_success());
        assert_eq!(goal.posted_count(), 2);
        assert_eq!(goal.remaining(), 0);
        assert!(goal.is_met());
    }

    #[test]
    fn test_reset_clears_progress() {
        let mut goal = PostGoal::new(3);
        goal.record_success();
        goal.reset(7);
        assert_eq!(goal.daily_goal(), 7);
        assert_eq!(goal.posted_count(), 0);
    }

    #[test]
    fn test_zero_goal_is_met() {
        assert!(PostGoal::default().is_met());
    }
}
