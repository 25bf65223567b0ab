#![no_std]
#![no_main]

use bmp_console::engine::EspI2cEngine;
use bmp_core::acquisition::{AcquisitionConfig, AcquisitionController};
use bmp_core::adapter::BusAdapter;
use bmp_core::format::split_centi;
use bmp_core::signal::CompletionSignal;
use core::fmt::Write;
use defmt::{error, info};
use esp_hal::timer::systimer::SystemTimer;
use esp_hal::{
    clock::CpuClock,
    i2c::master::{Config, I2c},
};
use heapless::String;

use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Completion mailbox shared between the I2C engine and the bus adapter.
static BUS_COMPLETION: CompletionSignal = CompletionSignal::new();

#[esp_hal_embassy::main]
async fn main(_spawner: Spawner) {
    rtt_target::rtt_init_defmt!();

    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    info!("Embassy initialized!");

    let i2c_driver = I2c::new(peripherals.I2C0, Config::default())
        .unwrap()
        .with_sda(peripherals.GPIO4)
        .with_scl(peripherals.GPIO5);

    let adapter = BusAdapter::new(
        EspI2cEngine::new(i2c_driver, &BUS_COMPLETION),
        &BUS_COMPLETION,
        Delay,
    );
    let mut acquisition = AcquisitionController::new(adapter, AcquisitionConfig::default());

    acquisition.configure();
    if acquisition.tally().total() > 0 {
        // Startup failures are reported but the sample loop runs anyway;
        // a sensor that appears later will just start answering.
        error!("Sensor configuration incomplete: {}", acquisition.tally());
    } else {
        info!("BMP280 configured, chip id verified");
    }

    loop {
        match acquisition.sample() {
            Ok(reading) => {
                let mut line: String<64> = String::new();
                let _ = write!(
                    line,
                    "True Temperature - {} C | True Pressure - {} hPa",
                    split_centi(reading.temperature_centi_c),
                    split_centi(reading.pressure_pa as i32),
                );
                info!("{}", line.as_str());
            }
            Err(_) => error!("Measurement failed: {}", acquisition.tally()),
        }

        Timer::after(Duration::from_millis(3000)).await;
    }
}
