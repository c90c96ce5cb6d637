//! `atomic_sched`: the multi-level process scheduling core of a small
//! teaching kernel. Round-robin, lottery, and best-job-first queue
//! disciplines over one process table, aged to prevent starvation, plus the
//! sleep/wakeup and semaphore primitives the rest of the kernel blocks on.
//!
//! Virtual memory, a real file system, ring-3 trap delivery, and ELF/exec
//! are external collaborators this core does not implement — see each
//! module's own documentation for the narrow contract it models instead.
#![cfg_attr(not(test), no_std)]
#![feature(abi_x86_interrupt)]

pub mod cpu;
pub mod demo;
pub mod interrupts;
pub mod memory;
pub mod param;
pub mod proc;
pub mod serial;
pub mod sync;
pub mod syscalls;
pub mod time;

#[cfg(test)]
pub(crate) mod test_support {
    //! A single crate-wide test mutex. Every `#[cfg(test)]` module that
    //! touches the shared `proc::PTABLE` or per-CPU statics serializes on
    //! this one lock rather than a file-local static: cargo's default test
    //! harness runs all of a crate's unit tests in one process on multiple
    //! threads, so two *different* per-file locks would still let, say, a
    //! `proc::tests` case and a `proc::sem::tests` case interleave on the
    //! same table.
    pub static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
}

#[cfg(not(test))]
mod boot {
    use bootloader::{entry_point, BootInfo};
    use core::panic::PanicInfo;

    entry_point!(kernel_main);

    /// Kernel entry point handed to us by the `bootloader` crate once
    /// protected mode, a GDT, and identity-mapped physical memory are set
    /// up. This core needs none of `BootInfo`'s memory-map detail — it owns
    /// no page-table or physical-frame allocator (see `memory::AddressSpace`).
    fn kernel_main(_boot_info: &'static BootInfo) -> ! {
        crate::serial::init();
        crate::interrupts::init();
        crate::log_info!("atomic_sched: kernel started");

        crate::memory::init();
        crate::proc::init();
        crate::syscalls::init();
        crate::demo::spawn_all();
        crate::log_info!("atomic_sched: demo processes spawned, entering scheduler");

        crate::cpu::enable_interrupts();
        crate::proc::scheduler_loop();
    }

    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        crate::log_error!("{}", info);
        loop {
            x86_64::instructions::hlt();
        }
    }
}
