//! CPU idle hook for the blocking event wait.

/// Pause until something may have changed: `hlt` on bare metal (the next
/// timer or input interrupt wakes us), a spin hint anywhere else.
#[inline]
pub fn idle() {
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    x86_64::instructions::hlt();
    #[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
    core::hint::spin_loop();
}
