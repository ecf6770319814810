use rand::Rng;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use topic_observer::{DedupPolicy, MessageId, Observer, ObserverConfig, Producer, Subscriber};
use tracing_subscriber::EnvFilter;

#[derive(Serialize, Deserialize, Debug)]
struct TemperatureReading {
    sensor_id: String,
    temperature: f64,
    timestamp: u64,
    location: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let readings: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(20);
    let alert_threshold: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(30.0);

    let config = ObserverConfig {
        name: "sensor_feed".to_string(),
        dedup: DedupPolicy::SequenceSpan(8),
        ..Default::default()
    };
    let observer = match Observer::new(config) {
        Ok(o) => Arc::new(o),
        Err(e) => {
            println!("Failed to create observer: {}", e);
            return;
        }
    };

    let sensors: Vec<_> = [("s1", "lab"), ("s2", "roof")]
        .iter()
        .map(|(sensor_id, location)| {
            let observer = Arc::clone(&observer);
            let (sensor_id, location) = (sensor_id.to_string(), location.to_string());
            thread::spawn(move || run_sensor(observer, &sensor_id, &location, readings))
        })
        .collect();

    for sensor in sensors {
        if let Err(e) = sensor.join() {
            println!("Sensor thread panicked: {:?}", e);
        }
    }

    run_monitor(&observer, alert_threshold);

    let stats = observer.stats();
    println!(
        "Appended {} readings, suppressed {} resends, acknowledged {}",
        stats.messages_appended, stats.duplicates_suppressed, stats.messages_acknowledged
    );
}

fn run_sensor(observer: Arc<Observer>, sensor_id: &str, location: &str, readings: usize) {
    let topic = format!("/temperature/{}/{}", location, sensor_id);
    let producer = match Producer::new(observer, &topic) {
        Ok(p) => p,
        Err(e) => {
            println!("Failed to create producer: {}", e);
            return;
        }
    };

    let mut rng = rand::thread_rng();
    for _ in 0..readings {
        let reading = TemperatureReading {
            sensor_id: sensor_id.to_string(),
            temperature: 25.0 + rng.gen_range(-10.0..10.0),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            location: location.to_string(),
        };

        let payload = match serde_json::to_vec(&reading) {
            Ok(p) => p,
            Err(e) => {
                println!("Failed to serialize reading: {}", e);
                continue;
            }
        };

        // A flaky link sometimes delivers the same reading twice
        let id = MessageId::new();
        let resends = if rng.gen_bool(0.3) { 2 } else { 1 };
        for _ in 0..resends {
            match producer.publish_with_id(id, payload.clone()) {
                Ok(sqn) => println!("{} published {:.1}°C at {}", sensor_id, reading.temperature, sqn),
                Err(e) => println!("Failed to publish temperature: {}", e),
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn run_monitor(observer: &Arc<Observer>, alert_threshold: f64) {
    for topic in observer.topics_matching("/temperature/#") {
        let mut subscriber = Subscriber::new(Arc::clone(observer), &topic);
        loop {
            let batch = match subscriber.poll(16) {
                Ok(batch) if batch.is_empty() => break,
                Ok(batch) => batch,
                Err(e) => {
                    println!("Error polling {}: {}", topic, e);
                    break;
                }
            };

            for (sqn, payload) in batch {
                match serde_json::from_slice::<TemperatureReading>(&payload) {
                    Ok(reading) if reading.temperature > alert_threshold => println!(
                        "ALERT [{}#{}]: {:.1}°C at {} (sensor {})",
                        topic, sqn, reading.temperature, reading.location, reading.sensor_id
                    ),
                    Ok(_) => {}
                    Err(e) => println!("Failed to parse temperature reading: {}", e),
                }
            }

            if let Err(e) = subscriber.commit() {
                println!("Failed to acknowledge {}: {}", topic, e);
            }
        }
    }
}
