//! Replay a short recorded session and print the persona report

fn main() {
    let json = r#"[
        { "timestamp_ms": 1705327200000, "type": "resize", "width": 1440, "height": 900 },
        { "timestamp_ms": 1705327200100, "type": "pointer_move", "x": 120, "y": 340 },
        { "timestamp_ms": 1705327200200, "type": "pointer_move", "x": 260, "y": 360 },
        { "timestamp_ms": 1705327200300, "type": "pointer_move", "x": 420, "y": 380 },
        { "timestamp_ms": 1705327200400, "type": "pointer_move", "x": 600, "y": 395 },
        { "timestamp_ms": 1705327200650, "type": "click", "x": 604, "y": 398, "pressure": 0.8 },
        { "timestamp_ms": 1705327201100, "type": "click", "x": 610, "y": 402 },
        { "timestamp_ms": 1705327201500, "type": "scroll", "offset": 0 },
        { "timestamp_ms": 1705327202500, "type": "scroll", "offset": 480 },
        { "timestamp_ms": 1705327203200, "type": "key_press", "key": "Enter" },
        { "timestamp_ms": 1705327204000, "type": "click", "x": 220, "y": 90 },
        { "timestamp_ms": 1705327206500, "type": "pointer_move", "x": 240, "y": 110 }
    ]"#;

    match synheart_persona::interactions_to_report(json) {
        Ok(report) => println!("{report}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
