//! Live-allocation accounting around failed and successful builds.
//!
//! Kept in its own test binary with a single test so no other test thread
//! allocates while the counter is being read.

use iioctx_core::create_xml_context_mem;
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicIsize, Ordering};

struct Counting;

static LIVE_BYTES: AtomicIsize = AtomicIsize::new(0);

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            LIVE_BYTES.fetch_add(layout.size() as isize, Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        LIVE_BYTES.fetch_sub(layout.size() as isize, Ordering::SeqCst);
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

const BAD_CHANNEL: &str = r#"<context>
    <device id="iio:device0"><channel id="voltage0"><attribute name="raw"/></channel></device>
    <device id="iio:device1">
        <channel id="voltage0"><attribute name="raw"/></channel>
        <channel id="voltage1"><attribute name="scale"/></channel>
        <channel name="broken"/>
        <channel id="voltage3"/>
        <attribute name="sampling_frequency"/>
    </device>
</context>"#;

const MALFORMED: &[u8] = b"<context><device id=\"iio:device0\"></context>";

const VALID: &str = r#"<context>
    <device id="iio:device0"><channel id="voltage0" type="output"><attribute name="raw"/></channel></device>
</context>"#;

fn live() -> isize {
    LIVE_BYTES.load(Ordering::SeqCst)
}

#[test]
fn test_builds_release_everything() {
    // Warm up lazily initialized state before taking a baseline.
    let _ = create_xml_context_mem(BAD_CHANNEL.as_bytes());
    let _ = create_xml_context_mem(MALFORMED);
    drop(create_xml_context_mem(VALID.as_bytes()));

    let baseline = live();

    for _ in 0..2 {
        let err = create_xml_context_mem(BAD_CHANNEL.as_bytes()).unwrap_err();
        drop(err);
        assert_eq!(live(), baseline);

        let err = create_xml_context_mem(MALFORMED).unwrap_err();
        drop(err);
        assert_eq!(live(), baseline);
    }

    let ctx = create_xml_context_mem(VALID.as_bytes()).unwrap();
    assert!(live() > baseline);
    drop(ctx);
    assert_eq!(live(), baseline);
}
