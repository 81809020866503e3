#![no_std]
#![no_main]

mod clock;
mod logger;
mod potentiometer;

use panic_halt as _;

#[rtic::app(device = stm32f4xx_hal::pac, peripherals = true)]
mod app {
    use door_control::{DoorController, PositionBounds, RelayPin, Tick};
    use rtt_target::{rprintln, rtt_init_print};
    use stm32f4xx_hal::{
        adc::{config::AdcConfig, Adc},
        gpio::{gpioa, gpioc, Edge, Input, Output, PushPull},
        pac,
        prelude::*,
        timer::{CounterHz, Event},
    };

    use crate::{clock::MillisClock, potentiometer::Potentiometer};

    // Potentiometer readings at the closed and open end of travel
    const POSITION_CLOSED: i16 = 180;
    const POSITION_OPEN: i16 = 3870;

    type Door = DoorController<Potentiometer, RelayPin<gpioa::PA8<Output<PushPull>>>, MillisClock>;

    #[shared]
    struct Shared {
        door: Door,
    }

    #[local]
    struct Local {
        // Wall button
        button: gpioa::PA0<Input>,
        // On-board LED (active low), mirrors the relay
        led: gpioc::PC13<Output<PushPull>>,
        // 1 kHz millisecond timer
        ticker: CounterHz<pac::TIM2>,
    }

    #[init]
    fn init(mut ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        rtt_init_print!();
        crate::logger::init(log::LevelFilter::Debug);

        rprintln!("Initializing");

        let mut syscfg = ctx.device.SYSCFG.constrain();

        // Clock setup
        let rcc = ctx.device.RCC.constrain();
        let clocks = rcc.cfgr.sysclk(48.MHz()).freeze();

        let mut ticker = ctx.device.TIM2.counter_hz(&clocks);
        if let Err(e) = ticker.start(1.kHz()) {
            rprintln!("Could not start millisecond timer: {:?}", e);
        }
        ticker.listen(Event::Update);

        rprintln!("Clock setup done");

        // GPIO setup
        let gpioa = ctx.device.GPIOA.split();
        let gpioc = ctx.device.GPIOC.split();

        let relay = RelayPin::new(gpioa.pa8.into_push_pull_output());
        let led = gpioc.pc13.into_push_pull_output();
        let mut button = gpioa.pa0.into_pull_up_input();

        // Potentiometer wiper on PA1 (ADC1 channel 1)
        let adc = Adc::adc1(ctx.device.ADC1, true, AdcConfig::default());
        let potentiometer = Potentiometer::new(adc, gpioa.pa1.into_analog());

        rprintln!("ADC and GPIO setup done");

        // Wire up button interrupt
        button.make_interrupt_source(&mut syscfg);
        button.enable_interrupt(&mut ctx.device.EXTI);
        button.trigger_on_edge(&mut ctx.device.EXTI, Edge::Falling);

        let bounds = PositionBounds::new(POSITION_CLOSED, POSITION_OPEN).unwrap_or_default();
        let door = DoorController::new(potentiometer, relay, MillisClock, bounds);
        rprintln!(
            "Door controller ready at position {}",
            door.current_position()
        );

        rprintln!("Done initializing");

        (Shared { door }, Local { button, led, ticker }, init::Monotonics())
    }

    #[idle(shared = [door], local = [led])]
    fn idle(mut ctx: idle::Context) -> ! {
        loop {
            let (tick, relay, snapshot) = ctx
                .shared
                .door
                .lock(|door| (door.execute(), door.relay_output(), door.snapshot()));

            if relay {
                ctx.local.led.set_low();
            } else {
                ctx.local.led.set_high();
            }

            if let Tick::Transition { .. } = tick {
                rprintln!(
                    ":: Update [State={:?}] [Position={}] [Result={:?}]",
                    snapshot.state,
                    snapshot.position,
                    snapshot.result
                );
            }
        }
    }

    #[task(binds = TIM2, local = [ticker])]
    fn millis(ctx: millis::Context) {
        ctx.local.ticker.clear_interrupt(Event::Update);
        crate::clock::tick();
    }

    #[task(binds = EXTI0, shared = [door], local = [button, open: bool = false])]
    fn button_click(mut ctx: button_click::Context) {
        ctx.local.button.clear_interrupt_pending_bit();

        // Each press sends the door to the other end
        *ctx.local.open = !*ctx.local.open;
        let target = if *ctx.local.open { 100 } else { 0 };
        rprintln!("Button pressed, target {}%", target);
        ctx.shared.door.lock(|door| door.set_target(target));
    }
}
