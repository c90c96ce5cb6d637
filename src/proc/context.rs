//! The coroutine register swap the scheduler loop and `sched()` ride on.
//! Kept in the teacher's own hand-written `naked_asm!` idiom rather than FFI
//! to external assembly, trimmed to the callee-saved registers this build
//! actually needs to preserve across a switch.

use core::arch::naked_asm;

/// Callee-saved x86_64 System V registers, plus the return address each
/// switch resumes at.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Context {
    pub rsp: u64,
    pub rbp: u64,
    pub rbx: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub rip: u64,
}

impl Context {
    /// An empty context, filled in by the first `switch_context` call that
    /// switches away from it (the scheduler loop's own saved context).
    pub const fn empty() -> Self {
        Context { rsp: 0, rbp: 0, rbx: 0, r12: 0, r13: 0, r14: 0, r15: 0, rip: 0 }
    }

    /// A fresh context for a process that has never run: execution begins
    /// at `entry` (the process trampoline) with a clean stack.
    pub fn new(entry: u64, stack_top: u64) -> Self {
        let aligned_sp = stack_top & !0xF;
        Context { rsp: aligned_sp, rbp: 0, rbx: 0, r12: 0, r13: 0, r14: 0, r15: 0, rip: entry }
    }
}

/// Save the caller's callee-saved registers into `old`, restore `new`'s,
/// and jump to `new`'s saved `rip`. When some later switch targets `old`
/// again, execution resumes right after this call as if it had returned
/// normally — the two coroutines take turns owning the CPU's register file.
///
/// # Safety
/// `old` and `new` must point at valid, live `Context`s; `new.rsp` must
/// point into a stack that is either fresh (via `Context::new`) or was
/// itself saved by a prior `switch_context`.
#[unsafe(naked)]
pub unsafe extern "C" fn switch_context(old: *mut Context, new: *const Context) {
    naked_asm!(
        "mov [rdi + 0x00], rsp",
        "mov [rdi + 0x08], rbp",
        "mov [rdi + 0x10], rbx",
        "mov [rdi + 0x18], r12",
        "mov [rdi + 0x20], r13",
        "mov [rdi + 0x28], r14",
        "mov [rdi + 0x30], r15",
        "lea rax, [rip + 2f]",
        "mov [rdi + 0x38], rax",

        "mov rsp, [rsi + 0x00]",
        "mov rbp, [rsi + 0x08]",
        "mov rbx, [rsi + 0x10]",
        "mov r12, [rsi + 0x18]",
        "mov r13, [rsi + 0x20]",
        "mov r14, [rsi + 0x28]",
        "mov r15, [rsi + 0x30]",
        "jmp [rsi + 0x38]",

        "2:",
        "ret",
    );
}
