//! 话题库 - 业务能力层
//!
//! 负责去重的话题积压：加载、随机挑选、向生成服务补充新话题

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, error, info, warn};

use crate::models::topic::fold_key;
use crate::models::Topic;
use crate::services::content_generator::ContentGenerator;
use crate::services::line_store::LineStore;
use crate::workflow::compose::clean_candidate;

/// 话题库
///
/// - 内存中的有序列表 + 大小写折叠后的键集合
/// - 任意两条话题的折叠键都不相同
/// - 新话题先追加到存储，再进入内存
pub struct TopicStore {
    topics: Vec<Topic>,
    keys: HashSet<String>,
    store: Box<dyn LineStore>,
    rng: StdRng,
    /// 持久化失败后只在内存中继续
    persistence_degraded: bool,
}

impl TopicStore {
    pub fn new(store: Box<dyn LineStore>, rng: StdRng) -> Self {
        Self {
            topics: Vec::new(),
            keys: HashSet::new(),
            store,
            rng,
            persistence_degraded: false,
        }
    }

    /// 读入已保存的话题；读取失败时以空库继续
    pub async fn load(&mut self) -> usize {
        let lines = match self.store.load().await {
            Ok(lines) => lines,
            Err(e) => {
                error!("❌ 读取话题库失败，以空话题库继续: {}", e);
                Vec::new()
            }
        };

        let mut duplicates = 0;
        for line in lines {
            let Some(topic) = Topic::new(&line) else {
                continue;
            };
            if !self.keys.insert(topic.key()) {
                duplicates += 1;
                continue;
            }
            self.topics.push(topic);
        }
        if duplicates > 0 {
            debug!("话题库中有 {} 条重复行被忽略", duplicates);
        }

        info!("📚 已加载 {} 个话题 ({})", self.topics.len(), self.store.describe());
        self.topics.len()
    }

    /// 均匀随机挑选一个话题，话题库为空时返回 None
    pub fn pick(&mut self) -> Option<Topic> {
        self.topics.choose(&mut self.rng).cloned()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.keys.contains(&fold_key(text))
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// 接收一个候选话题；重复或空白时返回 false
    pub async fn add(&mut self, candidate: &str) -> bool {
        let Some(topic) = Topic::new(candidate) else {
            return false;
        };
        let key = topic.key();
        if self.keys.contains(&key) {
            return false;
        }

        if let Err(e) = self.store.append(topic.text()).await {
            if !self.persistence_degraded {
                error!("❌ 话题写入失败，本次运行改为仅内存保存: {}", e);
            }
            self.persistence_degraded = true;
        }

        self.keys.insert(key);
        self.topics.push(topic);
        true
    }

    /// 补充话题直到数量达到 `min_count`
    ///
    /// 每轮向生成服务要一批候选，过滤掉已有话题后追加；某一轮一个都没加上就停止。
    ///
    /// # 参数
    /// - `generator`: 提供候选话题的生成服务
    /// - `min_count`: 目标话题数量
    /// - `batch_size`: 每轮请求的候选数量
    ///
    /// # 返回
    /// 本次新增的话题数量
    pub async fn discover(
        &mut self,
        generator: &dyn ContentGenerator,
        min_count: usize,
        batch_size: usize,
    ) -> usize {
        let mut added_total = 0;

        while self.len() < min_count {
            let wanted = batch_size.max(min_count - self.len());
            info!("🔎 话题库 {}/{}，请求 {} 个新话题...", self.len(), min_count, wanted);

            let candidates = generator.discover_topics(wanted).await;
            let mut added = 0;
            for candidate in candidates.iter().filter_map(|c| clean_candidate(c)) {
                if self.add(&candidate).await {
                    info!("✓ 新话题: {}", candidate);
                    added += 1;
                }
            }

            if added == 0 {
                warn!(
                    "⚠️ 本轮发现没有新增话题 (候选 {} 个)，停止补充",
                    candidates.len()
                );
                break;
            }
            added_total += added;
        }

        if added_total > 0 {
            info!("话题发现完成，新增 {} 个，当前共 {} 个", added_total, self.len());
        }
        added_total
    }
}
