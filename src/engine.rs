use crate::error::Result;
use crate::options::SimpOptions;

/// Execution context shared by every pipeline stage: the validated options
/// and the worker pool stages run on. Built once, torn down on drop.
pub struct Engine {
    pool: rayon::ThreadPool,
    opts: SimpOptions,
}

impl Engine {
    pub fn new(opts: SimpOptions) -> Result<Self> {
        opts.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.threads as usize)
            .thread_name(|i| format!("simp-worker-{i}"))
            .build()?;
        tracing::debug!(threads = pool.current_num_threads(), "engine ready");
        Ok(Engine { pool, opts })
    }

    /// Run `stage` inside the worker pool. Returns once every task it
    /// spawned has retired.
    pub fn install<R: Send>(&self, stage: impl FnOnce() -> R + Send) -> R {
        self.pool.install(stage)
    }

    pub fn options(&self) -> &SimpOptions {
        &self.opts
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("threads", &self.num_threads())
            .field("opts", &self.opts)
            .finish()
    }
}
