//! End-to-end tests for jevents.
//!
//! These use a small embedded event list shaped like the vendor files to
//! exercise the whole pipeline: file loading → tokenizing → walking → sink.

use std::io::Write;
use std::path::Path;

use jevents::error::{EIO, Error};
use jevents::{EventRecord, ParseContext, json_events, parse_events, parse_events_in, status_of};

const HASWELL_SAMPLE: &str = r#"[
  {
    "EventCode": "0x3C",
    "UMask": "0x00",
    "EventName": "CPU_CLK_UNHALTED.THREAD_P",
    "BriefDescription": "Thread cycles when thread is not in halt state.",
    "Counter": "0,1,2,3",
    "SampleAfterValue": "2000003",
    "CounterMask": "0",
    "Invert": "0",
    "AnyThread": "0",
    "EdgeDetect": "0",
    "PEBS": "0",
    "MSRIndex": "0",
    "MSRValue": "0",
    "Errata": "null"
  },
  {
    "EventCode": "0xCD",
    "UMask": "0x01",
    "EventName": "MEM_TRANS_RETIRED.LOAD_LATENCY_GT_4",
    "BriefDescription": "Loads with latency value being above 4.",
    "SampleAfterValue": "100003",
    "PEBS": "2",
    "MSRIndex": "0x3F6",
    "MSRValue": "0x4",
    "Errata": "HSD76, HSD25, HSM26",
    "Data_LA": "1"
  },
  {
    "MSRValue": "0x3f803c0001",
    "EventCode": "0xB7, 0xBB",
    "UMask": "0x01",
    "EventName": "OFFCORE_RESPONSE.DEMAND_DATA_RD.LLC_HIT.ANY_RESPONSE",
    "BriefDescription": "Counts demand data reads that hit in the LLC",
    "MSRIndex": "0x1a6,0x1a7",
    "SampleAfterValue": "100003",
    "Offcore": "1"
  },
  {
    "EventCode": "0xC0",
    "UMask": "0x00",
    "EventName": "INST_RETIRED.ANY_P",
    "BriefDescription": "Number of instructions retired (Precise Event)",
    "PEBS": "1",
    "EdgeDetect": "1",
    "CounterMask": "1",
    "Invert": "1",
    "AnyThread": "1"
  }
]
"#;

fn collect(file: &str, source: &str) -> (jevents::Result<jevents::WalkStats>, Vec<EventRecord>) {
    let mut out = Vec::new();
    let res = parse_events(file, source, |ev| {
        out.push(ev.clone());
        0
    });
    (res, out)
}

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn full_sample_from_disk() {
    let file = write_temp(HASWELL_SAMPLE);
    let mut events = Vec::new();
    let stats = json_events(Some(file.path()), |ev| {
        events.push(ev.clone());
        0
    })
    .unwrap();

    assert_eq!(stats.events_emitted, 4);
    assert_eq!(events.len(), 4);

    assert_eq!(events[0].name, "cpu_clk_unhalted.thread_p");
    assert_eq!(events[0].event, "event=0x3C,umask=0x00,period=2000003");
    assert_eq!(
        events[0].description,
        "Thread cycles when thread is not in halt state"
    );

    assert_eq!(events[1].name, "mem_trans_retired.load_latency_gt_4");
    assert_eq!(events[1].event, "event=0xCD,umask=0x01,period=100003,ldlat=0x4");
    assert_eq!(
        events[1].description,
        "Loads with latency value being above 4. Spec update: HSD76, HSD25, HSM26. \
         Supports address when precise (Must be precise)"
    );

    // "0x1a6" is lowercase and does not match the MSR table.
    assert_eq!(events[2].event, "event=0xB7,umask=0x01,period=100003");
    assert_eq!(stats.unknown_msr_warnings, 1);

    assert_eq!(events[3].name, "inst_retired.any_p");
    assert_eq!(events[3].event, "event=0xC0,umask=0x00,edge=1,cmask=1,inv=1,any=1");
    assert_eq!(
        events[3].description,
        "Number of instructions retired (Precise Event)"
    );
}

#[test]
fn records_serialize_as_json() {
    let (res, events) = collect("sample.json", HASWELL_SAMPLE);
    res.unwrap();
    let line = serde_json::to_string(&events[0]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["name"], "cpu_clk_unhalted.thread_p");
    assert_eq!(value["event"], "event=0x3C,umask=0x00,period=2000003");
    assert!(value["description"].is_string());
}

#[test]
fn missing_file_is_read_error() {
    let res = json_events(Some(Path::new("/nonexistent/events.json")), |_| 0);
    let err = res.unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
    assert_eq!(err.status(), -EIO);
}

#[test]
fn syntax_error_reports_file_and_line() {
    let (res, events) = collect("bad.json", "[\n  {\"EventName\": \"a\",\n  }\n]");
    assert!(events.is_empty());
    let err = res.unwrap_err();
    assert!(matches!(err, Error::Syntax { line: 3, .. }));
    assert!(err.to_string().starts_with("bad.json:3: "));
}

#[test]
fn wrong_top_level_calls_sink_zero_times() {
    let (res, events) = collect("obj.json", r#"{"EventName": "a", "EventCode": "1"}"#);
    assert!(events.is_empty());
    let err = res.unwrap_err();
    assert_eq!(
        err.to_string(),
        "obj.json:1: expected top level array, got object"
    );
    assert_eq!(status_of(&Err::<(), _>(err)), -EIO);
}

#[test]
fn non_string_value_is_located() {
    let src = "[\n  {\n    \"EventName\": \"a\",\n    \"EventCode\": 60\n  }\n]";
    let (res, _) = collect("num.json", src);
    assert_eq!(
        res.unwrap_err().to_string(),
        "num.json:4: Expected string value, got primitive"
    );
}

#[test]
fn missing_event_name_stops_walk() {
    let src = r#"[
        {"EventName": "FIRST", "EventCode": "0x1"},
        {"EventCode": "0x2", "BriefDescription": "no name"},
        {"EventName": "THIRD", "EventCode": "0x3"}
    ]"#;
    let (res, events) = collect("partial.json", src);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "first");
    let err = res.unwrap_err();
    assert!(matches!(err, Error::IncompleteRecord { index: 1, .. }));
    assert_eq!(err.status(), -EIO);
}

#[test]
fn sink_code_is_returned_verbatim() {
    let mut seen = Vec::new();
    let res = parse_events("s.json", HASWELL_SAMPLE, |ev| {
        seen.push(ev.name.clone());
        if seen.len() == 2 { -22 } else { 0 }
    });
    assert_eq!(seen.len(), 2);
    assert_eq!(status_of(&res), -22);
}

#[test]
fn unknown_msr_warns_once_per_session() {
    let src = r#"[
        {"EventName": "a", "EventCode": "1", "MSRIndex": "0x100"},
        {"EventName": "b", "EventCode": "2", "MSRIndex": "0x101"}
    ]"#;
    let mut ctx = ParseContext::new("first.json");
    parse_events_in(&mut ctx, src, |_| 0).unwrap();
    ctx.set_file("second.json");
    parse_events_in(&mut ctx, src, |_| 0).unwrap();
    assert_eq!(ctx.stats().events_emitted, 4);
    assert_eq!(ctx.stats().unknown_msr_warnings, 1);

    // A fresh session warns again.
    let (res, _) = collect("third.json", src);
    assert_eq!(res.unwrap().unknown_msr_warnings, 1);
}

#[test]
fn trailing_top_level_value_is_rejected() {
    let src = "[{\"EventName\": \"a\", \"EventCode\": \"1\"}]\n[]\n";
    let (res, events) = collect("trail.json", src);
    assert_eq!(events.len(), 1);
    assert_eq!(
        res.unwrap_err().to_string(),
        "trail.json:2: unexpected objects at end, got array"
    );
}

#[test]
fn empty_array_is_fine() {
    let (res, events) = collect("empty.json", "[]");
    assert!(events.is_empty());
    assert_eq!(res.unwrap().events_emitted, 0);
}
