//! Next-frame task queue.
//!
//! Work that must observe fully-updated world matrices is queued here and
//! run once, right before the next frame is presented. The scheduler only
//! stores tasks; the owner of the context `C` drives [`FrameScheduler::run_pending`].

/// A callback queued for the next frame.
pub type FrameTask<C> = Box<dyn FnOnce(&mut C)>;

/// Per-frame task queue for a context type `C`.
pub struct FrameScheduler<C> {
    tasks: Vec<FrameTask<C>>,
    render_pending: bool,
    frame: u64,
}

impl<C> FrameScheduler<C> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            render_pending: false,
            frame: 0,
        }
    }

    /// Queue `task` to run exactly once before the next frame.
    pub fn run_before_next_frame<F>(&mut self, task: F)
    where
        F: FnOnce(&mut C) + 'static,
    {
        self.tasks.push(Box::new(task));
    }

    /// Ask for a redraw on the next frame.
    pub fn request_render(&mut self) {
        self.render_pending = true;
    }

    pub fn render_pending(&self) -> bool {
        self.render_pending
    }

    /// Number of tasks waiting for the next frame.
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Frames presented so far.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    /// Take the queued tasks and advance the frame counter.
    ///
    /// Tasks queued while the returned batch runs land in the following frame.
    pub fn begin_frame(&mut self) -> Vec<FrameTask<C>> {
        self.frame += 1;
        self.render_pending = false;
        std::mem::take(&mut self.tasks)
    }

    /// Run every task queued so far against `ctx`.
    ///
    /// `scheduler` locates this queue inside the context, which lets a task
    /// borrow the whole context mutably.
    pub fn run_pending<S>(ctx: &mut C, scheduler: S) -> usize
    where
        S: Fn(&mut C) -> &mut FrameScheduler<C>,
    {
        let tasks = scheduler(ctx).begin_frame();
        let count = tasks.len();
        for task in tasks {
            task(ctx);
        }
        if count > 0 {
            log::trace!("ran {} deferred frame task(s)", count);
        }
        count
    }
}

impl<C> Default for FrameScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for FrameScheduler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("pending", &self.tasks.len())
            .field("render_pending", &self.render_pending)
            .field("frame", &self.frame)
            .finish()
    }
}
