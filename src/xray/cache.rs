//! # 元素插值器缓存
//!
//! 按元素符号缓存 f1/f2 插值器。同一元素在进程内最多构造一次：
//! 第一个请求者负责加载，并发请求同一元素的线程阻塞等待并复用其结果。
//!
//! 锁粒度为单个元素：外层 `Mutex` 只保护槽位表的查找与插入，
//! 真正的加载在各元素自己的 `OnceLock` 内完成，不同元素的加载互不阻塞。
//!
//! 加载失败的结果会分发给所有正在等待的调用者，随后该槽位被移除，
//! 之后的请求会重新尝试加载。
//!
//! ## 依赖关系
//! - 被 `xray/resolver.rs` 与 `engine.rs` 使用
//! - 使用 `xray/data.rs` 读取散射因子表
//! - 使用 `xray/interpolate.rs` 构造插值器
//! - 使用 `parking_lot` 互斥锁

use crate::error::Result;
use crate::models::Composition;
use crate::xray::data::ElementDataSource;
use crate::xray::interpolate::Interpolator;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// 常用元素（显式预热时使用）
pub const PRIORITY_ELEMENTS: &[&str] = &[
    "H", "C", "N", "O", "F", "Na", "Mg", "Al", "Si", "P", "S", "Cl", "K", "Ca", "Ti", "Cr",
    "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Sr", "Zr", "Ag", "In", "Sn", "Ba",
    "Hf", "Ta", "W", "Pt", "Au", "Pb",
];

type Slot = Arc<OnceLock<Result<Arc<Interpolator>>>>;

/// 加载来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadOrigin {
    /// 预热加载
    Preload,
    /// 计算时按需加载
    Lazy,
}

/// 缓存统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    /// 当前已缓存的元素数
    pub cached_elements: usize,
    /// 经预热加载的元素数
    pub preloaded: u64,
    /// 按需加载的元素数
    pub lazy_loaded: u64,
    pub hits: u64,
    pub misses: u64,
    /// 调用数据源的次数
    pub loads: u64,
    pub load_failures: u64,
}

impl CacheStatistics {
    /// 命中率 (0.0 - 1.0)，无请求时为 0
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    preloaded: AtomicU64,
    lazy_loaded: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
}

impl Counters {
    fn reset(&self) {
        for c in [
            &self.preloaded,
            &self.lazy_loaded,
            &self.hits,
            &self.misses,
            &self.loads,
            &self.load_failures,
        ] {
            c.store(0, Ordering::Relaxed);
        }
    }
}

/// 元素插值器缓存
pub struct InterpolatorCache {
    source: Arc<dyn ElementDataSource>,
    slots: Mutex<HashMap<String, Slot>>,
    counters: Counters,
}

impl std::fmt::Debug for InterpolatorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpolatorCache")
            .field("source", &self.source.describe())
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}

impl InterpolatorCache {
    pub fn new(source: Arc<dyn ElementDataSource>) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// 数据源描述
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// 获取元素的插值器，未缓存时加载
    pub fn get_interpolator(&self, symbol: &str) -> Result<Arc<Interpolator>> {
        self.fetch(symbol, LoadOrigin::Lazy).0
    }

    /// 取插值器，并返回本次调用是否亲自执行了加载
    fn fetch(&self, symbol: &str, origin: LoadOrigin) -> (Result<Arc<Interpolator>>, bool) {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(symbol.to_string()).or_default())
        };

        let mut loaded_here = false;
        let result = slot
            .get_or_init(|| {
                loaded_here = true;
                self.build(symbol)
            })
            .clone();

        if !loaded_here {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return (result, false);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        match &result {
            Ok(_) => {
                let counter = match origin {
                    LoadOrigin::Preload => &self.counters.preloaded,
                    LoadOrigin::Lazy => &self.counters.lazy_loaded,
                };
                counter.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.counters.load_failures.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(element = symbol, error = %e, "element load failed, evicting slot");

                // 只移除本次失败的槽位，clear() 后新建的槽位不受影响
                let mut slots = self.slots.lock();
                if slots.get(symbol).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                    slots.remove(symbol);
                }
            }
        }

        (result, true)
    }

    fn build(&self, symbol: &str) -> Result<Arc<Interpolator>> {
        self.counters.loads.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let table = self.source.load(symbol)?;
        let points = table.len();
        let interpolator = Interpolator::new(Arc::new(table));

        tracing::debug!(
            element = symbol,
            points,
            elapsed_us = start.elapsed().as_micros() as u64,
            "built interpolator"
        );
        Ok(Arc::new(interpolator))
    }

    /// 元素是否已成功缓存
    pub fn is_cached(&self, symbol: &str) -> bool {
        self.slots
            .lock()
            .get(symbol)
            .and_then(|slot| slot.get())
            .is_some_and(|r| r.is_ok())
    }

    /// 批量预热，跳过已缓存的元素，遇到第一个错误即返回
    ///
    /// 返回由本次调用加载的元素数，由其它线程并发加载完成的不计入。
    pub fn warm<'a, I>(&self, symbols: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut loaded = 0;
        let mut seen = std::collections::HashSet::new();
        for symbol in symbols {
            if !seen.insert(symbol) || self.is_cached(symbol) {
                continue;
            }
            let (result, loaded_here) = self.fetch(symbol, LoadOrigin::Preload);
            result?;
            if loaded_here {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// 仅预热化学式中出现的元素
    pub fn warm_formula(&self, composition: &Composition) -> Result<usize> {
        let loaded = self.warm(composition.symbols())?;
        if loaded > 0 {
            tracing::debug!(
                formula = composition.formula(),
                loaded,
                "formula-scoped warm-up"
            );
        }
        Ok(loaded)
    }

    /// 预热一组常用元素，缺失数据的元素只记录警告
    ///
    /// 返回成功加载的元素数。
    pub fn warm_priority_set<'a, I>(&self, symbols: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut loaded = 0;
        for symbol in symbols {
            if self.is_cached(symbol) {
                continue;
            }
            match self.fetch(symbol, LoadOrigin::Preload) {
                (Ok(_), true) => loaded += 1,
                (Ok(_), false) => {}
                (Err(e), _) => {
                    tracing::warn!(element = symbol, error = %e, "priority warm-up skipped element")
                }
            }
        }
        tracing::info!(loaded, "priority warm-up finished");
        loaded
    }

    /// 当前统计
    pub fn stats(&self) -> CacheStatistics {
        let cached_elements = self
            .slots
            .lock()
            .values()
            .filter(|slot| matches!(slot.get(), Some(Ok(_))))
            .count();

        let c = &self.counters;
        CacheStatistics {
            cached_elements,
            preloaded: c.preloaded.load(Ordering::Relaxed),
            lazy_loaded: c.lazy_loaded.load(Ordering::Relaxed),
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            loads: c.loads.load(Ordering::Relaxed),
            load_failures: c.load_failures.load(Ordering::Relaxed),
        }
    }

    /// 计数器清零，不清除已缓存的插值器
    pub fn reset_stats(&self) {
        self.counters.reset();
    }

    /// 清除所有插值器并清零计数器
    pub fn clear(&self) {
        self.slots.lock().clear();
        self.counters.reset();
        tracing::debug!("interpolator cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XrayError;
    use crate::parsers::parse_formula;
    use crate::testutil::{synthetic_source, CountingSource};

    use std::sync::Barrier;
    use std::thread;

    fn counting_cache() -> (Arc<CountingSource>, InterpolatorCache) {
        let source = Arc::new(CountingSource::new(synthetic_source(&["Si", "O", "Fe"])));
        let cache = InterpolatorCache::new(source.clone());
        (source, cache)
    }

    #[test]
    fn test_concurrent_requests_load_once() {
        let (source, cache) = counting_cache();
        let cache = Arc::new(cache);
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_interpolator("Si").unwrap()
                })
            })
            .collect();

        let interps: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(source.loads_of("Si"), 1);
        assert!(interps.iter().all(|i| Arc::ptr_eq(i, &interps[0])));

        let stats = cache.stats();
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, threads as u64 - 1);
        assert_eq!(stats.lazy_loaded, 1);
        assert_eq!(stats.cached_elements, 1);
    }

    #[test]
    fn test_failure_reaches_waiters_and_is_retried() {
        let (source, cache) = counting_cache();

        let err = cache.get_interpolator("Au").unwrap_err();
        assert!(matches!(err, XrayError::UnknownElement { .. }));
        assert!(!cache.is_cached("Au"));

        // 失败不被缓存，再次请求会重新加载
        assert!(cache.get_interpolator("Au").is_err());
        assert_eq!(source.loads_of("Au"), 2);
        assert_eq!(cache.stats().load_failures, 2);
    }

    #[test]
    fn test_concurrent_failure_reaches_every_waiter() {
        let (source, cache) = counting_cache();
        let cache = Arc::new(cache);
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_interpolator("Au")
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for result in &results {
            assert!(matches!(result, Err(XrayError::UnknownElement { .. })), "got {:?}", result);
        }

        // 在途加载期间到达的线程共享同一个失败结果
        let loads = source.loads_of("Au");
        assert!(loads >= 1 && loads < threads, "{} loads for {} threads", loads, threads);

        let stats = cache.stats();
        assert_eq!(stats.load_failures, loads as u64);
        assert_eq!(stats.hits + stats.misses, threads as u64);
        assert_eq!(stats.misses, loads as u64);
        assert!(!cache.is_cached("Au"));

        // 失败槽位已移除，之后的请求重新加载
        assert!(cache.get_interpolator("Au").is_err());
        assert_eq!(source.loads_of("Au"), loads + 1);
    }

    #[test]
    fn test_concurrent_warm_counts_each_load_once() {
        let (source, cache) = counting_cache();
        let cache = Arc::new(cache);
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.warm(["Si", "O", "Fe"]).unwrap()
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 3);
        assert_eq!(source.total_loads(), 3);
        assert_eq!(cache.stats().preloaded, 3);
    }

    #[test]
    fn test_warm_formula_only_loads_present_elements() {
        let (source, cache) = counting_cache();
        let sio2 = parse_formula("SiO2").unwrap();

        assert_eq!(cache.warm_formula(&sio2).unwrap(), 2);
        assert!(cache.is_cached("Si"));
        assert!(cache.is_cached("O"));
        assert!(!cache.is_cached("Fe"));

        // 已缓存的元素被跳过
        assert_eq!(cache.warm_formula(&sio2).unwrap(), 0);
        assert_eq!(source.total_loads(), 2);

        let stats = cache.stats();
        assert_eq!(stats.preloaded, 2);
        assert_eq!(stats.lazy_loaded, 0);
    }

    #[test]
    fn test_warm_dedups_and_propagates_errors() {
        let (source, cache) = counting_cache();
        assert_eq!(cache.warm(["Si", "Si", "O"]).unwrap(), 2);
        assert_eq!(source.loads_of("Si"), 1);

        assert!(cache.warm(["Fe", "Xe"]).is_err());
        assert!(cache.is_cached("Fe"));
    }

    #[test]
    fn test_priority_set_skips_missing_elements() {
        let (_, cache) = counting_cache();
        let loaded = cache.warm_priority_set(PRIORITY_ELEMENTS.iter().copied());
        assert_eq!(loaded, 3);
        assert_eq!(cache.stats().cached_elements, 3);
    }

    #[test]
    fn test_reset_and_clear() {
        let (source, cache) = counting_cache();
        cache.get_interpolator("Si").unwrap();
        cache.get_interpolator("Si").unwrap();
        assert!((cache.stats().hit_rate() - 0.5).abs() < 1e-12);

        cache.reset_stats();
        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.cached_elements, 1);

        cache.clear();
        assert!(!cache.is_cached("Si"));
        assert_eq!(cache.stats(), CacheStatistics::default());

        cache.get_interpolator("Si").unwrap();
        assert_eq!(source.loads_of("Si"), 2);
    }
}
