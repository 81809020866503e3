//! The potentiometer on the door shaft that reports the door position.

use door_control::PositionSensor;
use stm32f4xx_hal::{
    adc::{config::SampleTime, Adc},
    gpio::{gpioa, Analog},
    pac,
};

pub struct Potentiometer {
    adc: Adc<pac::ADC1>,
    pin: gpioa::PA1<Analog>,
}

impl Potentiometer {
    pub fn new(adc: Adc<pac::ADC1>, pin: gpioa::PA1<Analog>) -> Self {
        Self { adc, pin }
    }
}

impl PositionSensor for Potentiometer {
    fn read_position(&mut self) -> i16 {
        // The long sample time smooths out some of the wiper noise
        let sample = self.adc.convert(&self.pin, SampleTime::Cycles_480);
        i16::try_from(sample).unwrap_or(i16::MAX)
    }
}
