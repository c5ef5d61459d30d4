//! Intrusive doubly-linked list with a sentinel header, the same shape as
//! xv6's `list.h`. The difference from a literal port is the representation:
//! instead of an embedded `struct list_head` reached through raw pointers,
//! every node is identified by a plain index into a shared link array (proc
//! slots and a handful of list headers share one id space), so the whole
//! thing stays safe-Rust and trivially testable on the host.
//!
//! Every ready-set (each MLFQ level, the Stride run list, the sleep list,
//! the free list) is one sentinel id in this same array; a process is a
//! member of at most one of them at a time, mirroring `struct proc`
//! embedding exactly one `struct list_head`.

pub const NIL: usize = usize::MAX;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ListLink {
    pub next: usize,
    pub prev: usize,
}

impl ListLink {
    pub const fn unlinked() -> Self {
        ListLink { next: NIL, prev: NIL }
    }
}

/// Turn `head` into an empty list: a sentinel whose next/prev both point at
/// itself.
pub fn init_head(links: &mut [ListLink], head: usize) {
    links[head] = ListLink { next: head, prev: head };
}

pub fn is_empty(links: &[ListLink], head: usize) -> bool {
    links[head].next == head
}

fn link_between(links: &mut [ListLink], node: usize, prev: usize, next: usize) {
    links[prev].next = node;
    links[next].prev = node;
    links[node].prev = prev;
    links[node].next = next;
}

/// Insert `node` right after `head` (xv6's `list_add`).
pub fn add(links: &mut [ListLink], head: usize, node: usize) {
    let next = links[head].next;
    link_between(links, node, head, next);
}

/// Insert `node` right before `head`, i.e. at the tail (`list_add_tail`).
pub fn add_tail(links: &mut [ListLink], head: usize, node: usize) {
    let prev = links[head].prev;
    link_between(links, node, prev, head);
}

/// Unlink `node` from whatever list it is on. Does not touch any external
/// cursor pointing at `node` — callers that maintain a pin (MLFQ's
/// round-robin cursor) must advance it off `node` themselves before calling
/// this, exactly as xv6's `dequeue` does.
pub fn del(links: &mut [ListLink], node: usize) {
    let prev = links[node].prev;
    let next = links[node].next;
    links[prev].next = next;
    links[next].prev = prev;
    links[node] = ListLink::unlinked();
}

/// First real node on `head`'s list, or `None` if empty.
pub fn first(links: &[ListLink], head: usize) -> Option<usize> {
    let n = links[head].next;
    if n == head { None } else { Some(n) }
}

pub fn next(links: &[ListLink], node: usize) -> usize {
    links[node].next
}

/// Splice every node on `src` onto the tail of `dst`, leaving `src` empty.
/// Mirrors `list_bulk_move_tail`. A no-op if `src` is already empty.
pub fn bulk_move_tail(links: &mut [ListLink], dst: usize, src: usize) {
    if is_empty(links, src) {
        return;
    }
    let src_first = links[src].next;
    let src_last = links[src].prev;
    let dst_last = links[dst].prev;

    links[dst_last].next = src_first;
    links[src_first].prev = dst_last;
    links[dst].prev = src_last;
    links[src_last].next = dst;

    init_head(links, src);
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: usize = 0;
    const B: usize = 1;
    const C: usize = 2;
    const HEAD: usize = 3;
    const HEAD2: usize = 4;
    const N: usize = 5;

    fn fresh() -> [ListLink; N] {
        let mut links = [ListLink::unlinked(); N];
        init_head(&mut links, HEAD);
        init_head(&mut links, HEAD2);
        links
    }

    #[test]
    fn empty_list_has_no_first() {
        let links = fresh();
        assert!(is_empty(&links, HEAD));
        assert_eq!(first(&links, HEAD), None);
    }

    #[test]
    fn add_tail_preserves_fifo_order() {
        let mut links = fresh();
        add_tail(&mut links, HEAD, A);
        add_tail(&mut links, HEAD, B);
        add_tail(&mut links, HEAD, C);

        let mut seen = vec![];
        let mut cur = first(&links, HEAD).unwrap();
        loop {
            seen.push(cur);
            let n = next(&links, cur);
            if n == HEAD {
                break;
            }
            cur = n;
        }
        assert_eq!(seen, vec![A, B, C]);
    }

    #[test]
    fn del_of_middle_node_does_not_disturb_others() {
        let mut links = fresh();
        add_tail(&mut links, HEAD, A);
        add_tail(&mut links, HEAD, B);
        add_tail(&mut links, HEAD, C);

        del(&mut links, B);

        assert_eq!(next(&links, A), C);
        assert_eq!(links[C].prev, A);
    }

    #[test]
    fn bulk_move_tail_appends_and_empties_source() {
        let mut links = fresh();
        add_tail(&mut links, HEAD, A);
        add_tail(&mut links, HEAD2, B);
        add_tail(&mut links, HEAD2, C);

        bulk_move_tail(&mut links, HEAD, HEAD2);

        assert!(is_empty(&links, HEAD2));
        let mut seen = vec![];
        let mut cur = first(&links, HEAD).unwrap();
        loop {
            seen.push(cur);
            let n = next(&links, cur);
            if n == HEAD {
                break;
            }
            cur = n;
        }
        assert_eq!(seen, vec![A, B, C]);
    }

    #[test]
    fn bulk_move_tail_from_empty_source_is_noop() {
        let mut links = fresh();
        add_tail(&mut links, HEAD, A);
        bulk_move_tail(&mut links, HEAD, HEAD2);
        assert_eq!(first(&links, HEAD), Some(A));
    }
}
