//! Architecture assembly: entry, trampoline, kernel vector and context-switch
//! code. spec.md §1/§6 name the context-switch primitive (`swtch`) and the
//! trap/trampoline assembly as external collaborators this core depends on
//! but does not implement — they live in a real boot image's `entry.S`,
//! `trampoline.S`, `kernelvec.S`, `switch.S`, none of which this repository
//! carries (see DESIGN.md). `swtch` is declared `extern "C"` in
//! `crate::proc` with no body here, same as the teacher's incomplete
//! assembly checkout.
