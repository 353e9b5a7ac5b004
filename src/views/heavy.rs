//! 人为注入的性能回归组件
//!
//! 两个组件都默认关闭，只在配置里显式打开时挂载到首页。

use rand::Rng;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
use tracing::warn;

use super::escape;

pub const LOADING_TEXT: &str = "Loading...";
pub const FINISHED_TEXT: &str = "⚠️ Main Thread Lag Finished";

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 5;

/// 阻塞延迟组件
///
/// `attach` 在调用线程上忙等，直到经过 `duration`，期间该线程无法处理任何其他工作。
/// 在多线程运行时里，它阻塞的是正在渲染页面的那个工作线程。
#[derive(Debug)]
pub struct BlockingDelay {
    duration: Duration,
    attached_at: Option<Instant>,
    finished: Arc<AtomicBool>,
}

/// 在其他线程观察 `BlockingDelay` 是否完成
#[derive(Debug, Clone)]
pub struct DelayObserver {
    finished: Arc<AtomicBool>,
}

impl DelayObserver {
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

impl Default for BlockingDelay {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl BlockingDelay {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            attached_at: None,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn observer(&self) -> DelayObserver {
        DelayObserver {
            finished: Arc::clone(&self.finished),
        }
    }

    pub fn attach(&mut self) {
        if self.attached_at.is_some() {
            return;
        }

        let start = Instant::now();
        self.attached_at = Some(start);

        while start.elapsed() < self.duration {
            std::hint::spin_loop();
        }

        self.finished.store(true, Ordering::Release);
        warn!(
            "阻塞延迟组件占用当前线程 {}ms",
            start.elapsed().as_millis()
        );
    }

    pub fn attached_at(&self) -> Option<Instant> {
        self.attached_at
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn text(&self) -> &'static str {
        if self.is_finished() {
            FINISHED_TEXT
        } else {
            LOADING_TEXT
        }
    }

    pub fn render(&self) -> String {
        format!(r#"<div class="heavy-client">{}</div>"#, self.text())
    }
}

/// 批量渲染组件：一次性生成并渲染大量条目，不做虚拟化和分页
#[derive(Debug)]
pub struct BulkGeneration {
    count: usize,
    items: Vec<String>,
}

impl Default for BulkGeneration {
    fn default() -> Self {
        Self::new(5000)
    }
}

impl BulkGeneration {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            items: Vec::new(),
        }
    }

    pub fn attach(&mut self) {
        if self.items.is_empty() {
            self.items = generate_items(self.count);
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn render(&self) -> String {
        let mut html = String::with_capacity(self.items.len() * 64);
        html.push_str(r#"<div class="heavy-component"><h2>Heavy Component (Performance Regression)</h2><div class="grid">"#);
        for item in &self.items {
            html.push_str(r#"<div class="heavy-item">"#);
            html.push_str(&escape(item));
            html.push_str("</div>");
        }
        html.push_str("</div></div>");
        html
    }
}

/// 生成 `Heavy Item <序号> - <随机串>` 形式的条目
pub fn generate_items(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| format!("Heavy Item {} - {}", i, random_token(&mut rng)))
        .collect()
}

fn random_token<R: Rng>(rng: &mut R) -> String {
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_blocking_delay_text_transition() {
        let mut delay = BlockingDelay::default();
        assert_eq!(delay.text(), LOADING_TEXT);
        assert!(delay.render().contains(LOADING_TEXT));

        delay.attach();

        let attached_at = delay.attached_at().unwrap();
        assert!(attached_at.elapsed() >= Duration::from_millis(500));
        assert_eq!(delay.text(), FINISHED_TEXT);
        assert!(delay.render().contains(FINISHED_TEXT));
    }

    #[test]
    fn test_blocking_delay_never_finishes_early() {
        let duration = Duration::from_millis(200);
        let mut delay = BlockingDelay::new(duration);
        let observer = delay.observer();

        let start = Instant::now();
        let watcher = thread::spawn(move || {
            // 只要观察到完成，距离开始必须已超过阻塞时长
            loop {
                if observer.is_finished() {
                    return start.elapsed();
                }
                assert!(start.elapsed() < Duration::from_secs(5), "阻塞组件一直未完成");
                thread::yield_now();
            }
        });

        delay.attach();
        let observed = watcher.join().unwrap();
        assert!(observed >= duration, "提前完成: {:?}", observed);
    }

    #[test]
    fn test_blocking_delay_attaches_once() {
        let mut delay = BlockingDelay::new(Duration::from_millis(10));
        delay.attach();
        let first = delay.attached_at();
        delay.attach();
        assert_eq!(delay.attached_at(), first);
    }

    #[test]
    fn test_bulk_generation_renders_all_items() {
        let mut bulk = BulkGeneration::default();
        assert!(bulk.items().is_empty());

        bulk.attach();
        assert_eq!(bulk.items().len(), 5000);

        let prefixes: HashSet<String> = bulk
            .items()
            .iter()
            .map(|item| item.split(" - ").next().unwrap().to_string())
            .collect();
        assert_eq!(prefixes.len(), 5000);
        for i in [0, 1, 2500, 4999] {
            assert!(prefixes.contains(&format!("Heavy Item {}", i)));
        }

        let html = bulk.render();
        assert_eq!(html.matches(r#"class="heavy-item""#).count(), 5000);
    }

    #[test]
    fn test_random_token_shape() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let token = random_token(&mut rng);
            assert_eq!(token.len(), TOKEN_LEN);
            assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }
}
