//! The relay wired in parallel to the opener's push button.

use core::convert::Infallible;

use embedded_hal::digital::v2::OutputPin;

/// Binary actuator output. Setting the current level again has no effect.
pub trait Relay {
    fn set_relay(&mut self, high: bool);
}

/// Relay driven by a GPIO pin that cannot fail, such as a push-pull output.
pub struct RelayPin<P> {
    pin: P,
}

impl<P> RelayPin<P>
where
    P: OutputPin<Error = Infallible>,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Release the underlying pin.
    pub fn free(self) -> P {
        self.pin
    }
}

impl<P> Relay for RelayPin<P>
where
    P: OutputPin<Error = Infallible>,
{
    fn set_relay(&mut self, high: bool) {
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match res {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }
}
