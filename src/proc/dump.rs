//! `procdump`: print pid, privlevel, state, name for every non-UNUSED slot.
//! Triggered by typing ^P at the console. spec.md §6. Field order kept
//! verbatim from `proc.c:846-871`.

use crate::proc::table::Ptable;
use crate::proc::Procstate;

fn state_name(state: Procstate) -> &'static str {
    match state {
        Procstate::Unused => "unused",
        Procstate::Embryo => "embryo",
        Procstate::Sleeping => "sleep ",
        Procstate::Runnable => "runble",
        Procstate::Running => "run   ",
        Procstate::Zombie => "zombie",
    }
}

/// No lock, to avoid wedging a stuck machine further (same rationale as
/// `proc.c`'s own comment on this function).
pub fn procdump(pt: &Ptable) {
    for p in pt.procs.iter() {
        if p.state == Procstate::Unused {
            continue;
        }
        let name_len = p.name.iter().position(|&b| b == 0).unwrap_or(p.name.len());
        let name = core::str::from_utf8(&p.name[..name_len]).unwrap_or("?");
        printf!("{} {} {} {}\n", p.pid, p.privlevel, state_name(p.state), name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc::table::Ptable;

    #[test]
    fn state_name_covers_every_variant() {
        assert_eq!(state_name(Procstate::Unused), "unused");
        assert_eq!(state_name(Procstate::Embryo), "embryo");
        assert_eq!(state_name(Procstate::Sleeping), "sleep ");
        assert_eq!(state_name(Procstate::Runnable), "runble");
        assert_eq!(state_name(Procstate::Running), "run   ");
        assert_eq!(state_name(Procstate::Zombie), "zombie");
    }

    #[test]
    fn skips_unused_slots_without_panicking() {
        let pt = Ptable::new();
        procdump(&pt);
    }
}
